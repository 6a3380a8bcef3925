#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc = include_str!("../README.md")]

/// Hash algorithm selection for the HMAC step
pub mod algorithm;

/// Output width and zero-padded formatting of passcodes
pub mod digits;

/// Error kinds shared by every operation
pub mod error;

/// HOTP (HMAC-based One-Time Password) generation and validation
pub mod hotp;

/// OTP key URIs (`otpauth://`) for authenticator apps
pub mod key;

/// TOTP (Time-based One-Time Password) generation and validation
pub mod totp;

pub use algorithm::Algorithm;
pub use digits::Digits;
pub use error::Error;
pub use key::Key;
