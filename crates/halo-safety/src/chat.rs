//! Chat hygiene
//!
//! Words on the blocklist are matched literally and case-insensitively and
//! replaced by [`MASK`]. Longer words are tried first so "spammer" is masked
//! whole even when "spam" is also listed.

use regex::{Regex, RegexBuilder};

use halo_core::{HaloError, HaloResult, SafetyConfig};

/// Replacement for a blocked word
pub const MASK: &str = "•••";

/// Trim surrounding whitespace and cap the length at `max_chars` characters
pub fn sanitize_input(input: &str, max_chars: usize) -> String {
    input.trim().chars().take(max_chars).collect()
}

/// Compiled chat blocklist
#[derive(Clone, Debug)]
pub struct ChatFilter {
    pattern: Option<Regex>,
    max_message_length: usize,
}

impl ChatFilter {
    /// Build a filter from blocklisted words. Blank words are ignored.
    pub fn new<I, S>(blocklist: I, config: &SafetyConfig) -> HaloResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = blocklist
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
        words.dedup();

        let pattern = if words.is_empty() {
            None
        } else {
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            let regex = RegexBuilder::new(&alternation)
                .case_insensitive(true)
                .build()
                .map_err(|e| HaloError::InvalidConfig(format!("chat blocklist: {}", e)))?;
            Some(regex)
        };

        Ok(ChatFilter {
            pattern,
            max_message_length: config.max_message_length,
        })
    }

    /// True when no word is blocklisted
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    /// Whether `message` contains a blocklisted word
    pub fn contains_blocked(&self, message: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(message))
    }

    /// Mask every blocklisted word in `message`
    pub fn mask(&self, message: &str) -> String {
        match &self.pattern {
            Some(p) => p.replace_all(message, MASK).into_owned(),
            None => message.to_string(),
        }
    }

    /// Trim, cap and mask an outgoing chat message
    pub fn prepare(&self, raw: &str) -> HaloResult<String> {
        let text = sanitize_input(raw, self.max_message_length);
        if text.is_empty() {
            return Err(HaloError::invalid_input("message is empty"));
        }
        Ok(self.mask(&text))
    }
}

/// Mask blocklisted words in a single message with default limits
pub fn sanitize_chat(message: &str, blocklist: &[&str]) -> HaloResult<String> {
    let filter = ChatFilter::new(blocklist.iter().copied(), &SafetyConfig::default())?;
    Ok(filter.mask(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_input_trims_and_caps() {
        assert_eq!(sanitize_input("  hello  ", 500), "hello");
        assert_eq!(sanitize_input("abcdef", 3), "abc");
        // Counts characters, not bytes
        assert_eq!(sanitize_input("ééééé", 2), "éé");
    }

    #[test]
    fn test_mask_is_case_insensitive() {
        let masked = sanitize_chat("You are SO Rude, rude!", &["rude"]).unwrap();
        assert_eq!(masked, "You are SO •••, •••!");
    }

    #[test]
    fn test_blocklist_words_are_literal() {
        // Regex metacharacters in the blocklist must not act as patterns
        let masked = sanitize_chat("a.c abc a+c", &["a.c", "a+c"]).unwrap();
        assert_eq!(masked, "••• abc •••");
    }

    #[test]
    fn test_longer_words_win() {
        let filter = ChatFilter::new(["spam", "spammer"], &SafetyConfig::default()).unwrap();
        assert_eq!(filter.mask("spammers"), "•••s");
    }

    #[test]
    fn test_blank_words_ignored() {
        let filter = ChatFilter::new(["", "   "], &SafetyConfig::default()).unwrap();
        assert!(filter.is_empty());
        assert_eq!(filter.mask("anything"), "anything");
        assert!(!filter.contains_blocked("anything"));
    }

    #[test]
    fn test_prepare_message() {
        let config = SafetyConfig {
            max_message_length: 12,
            ..SafetyConfig::default()
        };
        let filter = ChatFilter::new(["spam"], &config).unwrap();

        assert_eq!(filter.prepare("  buy spam now please ").unwrap(), "buy ••• now");
        assert!(filter.contains_blocked("SPAM"));
        assert!(matches!(filter.prepare("   "), Err(HaloError::InvalidInput(_))));
    }
}
