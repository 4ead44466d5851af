//! Log-safe rendering of secrets.

use std::fmt;

/// Redacted API key representation
///
/// Shows the first 4 characters followed by `***`; keys of 8 characters or
/// fewer are fully hidden.
#[derive(Clone, Debug)]
pub struct RedactedKey<'a> {
    inner: &'a str,
}

impl<'a> RedactedKey<'a> {
    /// # Example
    /// ```
    /// use drive_cost::logging::RedactedKey;
    ///
    /// let key = "a1b2c3d4e5f6a7b8c9d0";
    /// assert_eq!(RedactedKey::new(key).to_string(), "a1b2***");
    /// ```
    pub fn new(key: &'a str) -> Self {
        Self { inner: key }
    }
}

impl fmt::Display for RedactedKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const VISIBLE: usize = 4;
        if self.inner.len() <= 8 || !self.inner.is_char_boundary(VISIBLE) {
            write!(f, "***")
        } else {
            write!(f, "{}***", &self.inner[..VISIBLE])
        }
    }
}
