use fast32::base32;
use rand::Rng;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::digits::Digits;
use crate::error::Error;
use crate::key::Key;

/// Default secret size in bytes for [`generate_key`], per RFC 4226.
pub const DEFAULT_SECRET_SIZE: usize = 20;

/// Configuration for [`generate_code_custom`] and [`validate_custom`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Passcode width, six digits unless set
    pub digits: Digits,
    /// Hash algorithm for the HMAC step, SHA1 unless set
    pub algorithm: Algorithm,
}

/// Generate a six digit SHA1 passcode for `counter`.
pub fn generate_code(secret: &str, counter: u64) -> Result<String, Error> {
    generate_code_custom(secret, counter, Options::default())
}

/// Generate an HOTP passcode for `counter`.
///
/// `secret` is base32 text; it is trimmed, uppercased and re-padded with `=`
/// to a multiple of eight characters before decoding, so both padded and
/// unpadded forms are accepted.
pub fn generate_code_custom(secret: &str, counter: u64, opts: Options) -> Result<String, Error> {
    let mut secret = secret.trim().to_uppercase();
    match secret.len() % 8 {
        0 => {}
        n => secret.push_str(&"=".repeat(8 - n)),
    }

    let secret_bytes = base32::RFC4648
        .decode_str(&secret)
        .map_err(|_| Error::InvalidBase32)?;

    let sum = opts.algorithm.sign(&secret_bytes, &counter.to_be_bytes());

    // Dynamic truncation, RFC 4226 section 5.4: a data-dependent offset
    // selects four digest bytes read as a big-endian 31-bit value. The
    // section assumes a digest of at least 20 bytes; MD5's 16 byte digest
    // can point the offset past the last 4 byte window, so it is clamped
    // to keep the read inside the digest.
    let offset = ((sum[sum.len() - 1] & 0x0f) as usize).min(sum.len() - 4);
    let value = i64::from(
        (u32::from(sum[offset] & 0x7f) << 24)
            | (u32::from(sum[offset + 1]) << 16)
            | (u32::from(sum[offset + 2]) << 8)
            | u32::from(sum[offset + 3]),
    );

    let code = (value % opts.digits.modulus()) as i32;
    Ok(opts.digits.format(code))
}

/// Validate a six digit SHA1 passcode against `counter`.
///
/// Structural errors are reported as a plain `false`; use
/// [`validate_custom`] to tell them apart from a wrong code.
pub fn validate(passcode: &str, counter: u64, secret: &str) -> bool {
    validate_custom(passcode, counter, secret, Options::default()).unwrap_or(false)
}

/// Validate an HOTP passcode against a single counter value.
///
/// The candidate is compared to the recomputed code in constant time. A
/// well-formed but wrong passcode is `Ok(false)`; a candidate of the wrong
/// length is [`Error::InvalidInputLength`].
pub fn validate_custom(
    passcode: &str,
    counter: u64,
    secret: &str,
    opts: Options,
) -> Result<bool, Error> {
    let passcode = passcode.trim();
    if passcode.len() != opts.digits.length() {
        return Err(Error::InvalidInputLength);
    }

    let expected = generate_code_custom(secret, counter, opts)?;
    Ok(expected.as_bytes().ct_eq(passcode.as_bytes()).into())
}

/// Configuration for [`generate_key`].
#[derive(Debug, Clone)]
pub struct GenerateOpts {
    /// Name of the issuing organization, required
    pub issuer: String,
    /// Name of the user account, required
    pub account_name: String,
    /// Size of the generated secret in bytes, 20 unless set
    pub secret_size: usize,
    /// Passcode width recorded in the key
    pub digits: Digits,
    /// Hash algorithm recorded in the key
    pub algorithm: Algorithm,
}

impl Default for GenerateOpts {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            account_name: String::new(),
            secret_size: DEFAULT_SECRET_SIZE,
            digits: Digits::default(),
            algorithm: Algorithm::default(),
        }
    }
}

/// Create a new HOTP key with a freshly drawn random secret.
pub fn generate_key(opts: GenerateOpts) -> Result<Key, Error> {
    if opts.issuer.is_empty() {
        return Err(Error::MissingIssuer);
    }
    if opts.account_name.is_empty() {
        return Err(Error::MissingAccountName);
    }

    let secret_size = match opts.secret_size {
        0 => DEFAULT_SECRET_SIZE,
        n => n,
    };
    let mut secret = vec![0u8; secret_size];
    rand::rng().fill(secret.as_mut_slice());

    let key = Key::build(
        "hotp",
        &opts.issuer,
        &opts.account_name,
        [
            ("secret", base32::RFC4648_NOPAD.encode(&secret)),
            ("issuer", opts.issuer.clone()),
            ("algorithm", opts.algorithm.to_string()),
            ("digits", opts.digits.to_string()),
        ],
    )?;

    debug!(issuer = %opts.issuer, account = %opts.account_name, "generated new hotp key");
    Ok(key)
}
