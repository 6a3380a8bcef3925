use std::fmt;

/// The number of decimal digits in a generated passcode.
///
/// Six or eight are what authenticator apps expect, but any width up to nine
/// is representable since the truncated value fits 31 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digits(u32);

/// Six digit passcodes, the common default
pub const SIX: Digits = Digits(6);

/// Eight digit passcodes
pub const EIGHT: Digits = Digits(8);

impl Digits {
    /// Create a digit width. Callers normally use [`SIX`] or [`EIGHT`].
    pub const fn new(width: u32) -> Self {
        Self(width)
    }

    /// Zero-pad the decimal representation of `value` to exactly this width.
    ///
    /// `value` is non-negative by construction (it has already been reduced
    /// modulo `10^width`); the sign is not checked here.
    pub fn format(self, value: i32) -> String {
        format!("{:0width$}", value, width = self.0 as usize)
    }

    /// The number of characters in a formatted passcode.
    pub const fn length(self) -> usize {
        self.0 as usize
    }

    /// `10^width`, the modulus applied to the truncated HMAC value.
    pub(crate) const fn modulus(self) -> i64 {
        10_i64.pow(self.0)
    }
}

impl Default for Digits {
    fn default() -> Self {
        SIX
    }
}

impl fmt::Display for Digits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
