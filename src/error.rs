/// Errors returned by OTP generation, validation and key handling.
///
/// A wrong-but-well-formed passcode is not an error: validation returns
/// `Ok(false)` for it. Errors are reserved for structural problems with the
/// inputs themselves.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The secret could not be decoded as base32
    #[error("decoding of secret as base32 failed")]
    InvalidBase32,

    /// The candidate passcode length does not match the configured digits
    #[error("input length unexpected")]
    InvalidInputLength,

    /// Key generation requires an issuer
    #[error("issuer must be set")]
    MissingIssuer,

    /// Key generation requires an account name
    #[error("account name must be set")]
    MissingAccountName,

    /// The key URI is not syntactically valid
    #[error("invalid otpauth url")]
    Url(#[from] url::ParseError),
}
