//! Macro for implementing Display and FromStr for remote state enums
//!
//! Resource states travel as camelCase strings on the wire (`"active"`,
//! `"notPublished"`, ...). This macro keeps the two directions of that mapping
//! in a single place; the strings must match the enum's serde names.
//!
//! # Example
//!
//! ```rust
//! use devportal_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum ProductState {
//!     Published,
//!     NotPublished,
//! }
//!
//! impl_domain_status_conversions!(ProductState {
//!     Published => "published",
//!     NotPublished => "notPublished",
//! });
//! ```

/// Implements Display and FromStr traits for state enums
///
/// This macro generates:
/// - Display trait: converts enum variants to their wire strings
/// - FromStr trait: parses case-insensitive strings to enum variants
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
