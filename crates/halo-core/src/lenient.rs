//! Lenient decoding for snapshots handed over by external collaborators
//!
//! Viewer and content snapshots arrive as JSON from services HALO does not
//! control. A malformed optional field must never abort decoding and must
//! never widen access, so every decoder here resolves bad input toward the
//! more restrictive value.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

/// How a fractional number becomes a whole number of years
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rounding {
    /// Viewer ages round down: 17.9 is still 17
    Down,
    /// Minimum ages round up: a threshold of 20.5 requires 21
    Up,
}

fn years_from_f64(value: f64, rounding: Rounding) -> Option<u32> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let whole = match rounding {
        Rounding::Down => value.floor(),
        Rounding::Up => value.ceil(),
    };
    if whole > u32::MAX as f64 {
        return None;
    }
    Some(whole as u32)
}

struct YearsVisitor(Rounding);

impl<'de> Visitor<'de> for YearsVisitor {
    type Value = Option<u32>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a whole number of years")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(u32::try_from(v).ok())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(u32::try_from(v).ok())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(years_from_f64(v, self.0))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

/// Decode a viewer age; anything that is not a usable number becomes `None`
pub fn viewer_age<'de, D>(d: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    d.deserialize_any(YearsVisitor(Rounding::Down))
}

/// Decode a per-item minimum age; anything unusable becomes `None` so the
/// default threshold applies
pub fn minimum_age<'de, D>(d: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    d.deserialize_any(YearsVisitor(Rounding::Up))
}

/// A boolean whose malformed values resolve to a fixed fallback
struct FlagVisitor {
    fallback: bool,
}

impl<'de> Visitor<'de> for FlagVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(self.fallback)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(self.fallback)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(self.fallback)
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(self.fallback)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(self.fallback)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(self.fallback)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(self.fallback)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(self.fallback)
    }
}

/// Decode a permission flag; malformed values read as `false`
pub fn permission_flag<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    d.deserialize_any(FlagVisitor { fallback: false })
}

/// Default for an absent restriction flag
pub fn restricted_by_default() -> bool {
    true
}

/// Decode a restriction flag; malformed values read as `true`
pub fn restriction_flag<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    d.deserialize_any(FlagVisitor { fallback: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "viewer_age")]
        age: Option<u32>,
        #[serde(default, deserialize_with = "minimum_age")]
        minimum_age: Option<u32>,
        #[serde(default, deserialize_with = "permission_flag")]
        allowed: bool,
        #[serde(default, deserialize_with = "restriction_flag")]
        restricted: bool,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_well_formed_values_pass_through() {
        let p = sample(r#"{"age": 25, "minimum_age": 21, "allowed": true, "restricted": false}"#);
        assert_eq!(p.age, Some(25));
        assert_eq!(p.minimum_age, Some(21));
        assert!(p.allowed);
        assert!(!p.restricted);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let p = sample("{}");
        assert_eq!(p.age, None);
        assert_eq!(p.minimum_age, None);
        assert!(!p.allowed);
    }

    #[test]
    fn test_malformed_ages_become_none() {
        for raw in [r#""25""#, "-3", "null", "true", "[18]", r#"{"years": 30}"#, "1e300"] {
            let p = sample(&format!(r#"{{"age": {raw}, "minimum_age": {raw}}}"#));
            assert_eq!(p.age, None, "age {raw}");
            assert_eq!(p.minimum_age, None, "minimum_age {raw}");
        }
    }

    #[test]
    fn test_fractional_ages_round_toward_restriction() {
        let p = sample(r#"{"age": 17.9, "minimum_age": 20.5}"#);
        assert_eq!(p.age, Some(17));
        assert_eq!(p.minimum_age, Some(21));
    }

    #[test]
    fn test_malformed_flags_fail_closed() {
        let p = sample(r#"{"allowed": "yes", "restricted": "no"}"#);
        assert!(!p.allowed);
        assert!(p.restricted);

        let p = sample(r#"{"allowed": 1, "restricted": null}"#);
        assert!(!p.allowed);
        assert!(p.restricted);
    }
}
