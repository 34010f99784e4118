//! HALO Guardian - who may see what
//!
//! The access policy decides, for one viewer snapshot and one piece of
//! content, whether that content may be shown. It is a pure function of its
//! arguments: no ambient "current viewer", no cached decisions, no clock.
//!
//! # Decision order
//!
//! 1. Unrestricted content is visible to everyone
//! 2. Restricted content is hidden from unauthenticated callers
//! 3. Restricted content is hidden while elevated mode is off
//! 4. With elevated mode on, the viewer's age must reach the item's
//!    minimum age (18 unless the item says otherwise); unknown age hides
//!
//! Age verification turns a date of birth and an explicit "now" into a
//! whole-year age and a verified flag.

pub mod policy;
pub mod age;
pub mod notice;

pub use policy::*;
pub use age::*;
pub use notice::*;
