use std::time::SystemTime;

use fast32::base32;
use rand::Rng;
use tracing::{debug, trace};

use crate::algorithm::Algorithm;
use crate::digits::Digits;
use crate::error::Error;
use crate::hotp;
use crate::key::Key;

/// Default validity window of a TOTP passcode in seconds, per RFC 6238.
pub const DEFAULT_PERIOD: u64 = 30;

/// Default secret size in bytes for [`generate_key`].
pub const DEFAULT_SECRET_SIZE: usize = 10;

/// Configuration for [`generate_code_custom`] and [`validate_custom`].
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Validity window in seconds, 30 unless set
    pub period: u64,
    /// Number of adjacent windows accepted on either side during validation
    pub skew: u64,
    /// Passcode width, six digits unless set
    pub digits: Digits,
    /// Hash algorithm for the HMAC step, SHA1 unless set
    pub algorithm: Algorithm,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            skew: 1,
            digits: Digits::default(),
            algorithm: Algorithm::default(),
        }
    }
}

/// The moving factor: seconds since the epoch divided by the period.
fn counter_at(t: SystemTime, period: u64) -> u64 {
    let period = match period {
        0 => DEFAULT_PERIOD,
        p => p,
    };
    // SAFE: The timestamp is always after the UNIX epoch.
    #[allow(clippy::unwrap_used)]
    let unix = t
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    unix / period
}

/// Generate a six digit SHA1 passcode for time `t`.
pub fn generate_code(secret: &str, t: SystemTime) -> Result<String, Error> {
    generate_code_custom(secret, t, Options::default())
}

/// Generate a TOTP passcode for time `t`.
///
/// The time window index becomes the HOTP counter; everything else is
/// delegated to [`hotp::generate_code_custom`].
pub fn generate_code_custom(secret: &str, t: SystemTime, opts: Options) -> Result<String, Error> {
    hotp::generate_code_custom(
        secret,
        counter_at(t, opts.period),
        hotp::Options {
            digits: opts.digits,
            algorithm: opts.algorithm,
        },
    )
}

/// Validate a six digit SHA1 passcode against the current time with a skew
/// of one window.
///
/// Structural errors are reported as a plain `false`; use
/// [`validate_custom`] to tell them apart from a wrong code.
pub fn validate(passcode: &str, secret: &str) -> bool {
    validate_custom(passcode, secret, SystemTime::now(), Options::default()).unwrap_or(false)
}

/// Validate a TOTP passcode at time `t`, tolerating clock drift.
///
/// The current window is probed first, then each skew offset forward and
/// backward in increasing distance, `2 * skew + 1` counters in total. The
/// first match wins. A structural error from any probe aborts the scan:
/// every probe shares the same secret, so the remaining counters would fail
/// identically.
pub fn validate_custom(
    passcode: &str,
    secret: &str,
    t: SystemTime,
    opts: Options,
) -> Result<bool, Error> {
    let counter = counter_at(t, opts.period) as i64;

    let mut counters = Vec::with_capacity(2 * opts.skew as usize + 1);
    counters.push(counter as u64);
    for i in 1..=opts.skew as i64 {
        counters.push((counter + i) as u64);
        counters.push((counter - i) as u64);
    }

    trace!(candidates = counters.len(), "scanning totp skew window");
    let hotp_opts = hotp::Options {
        digits: opts.digits,
        algorithm: opts.algorithm,
    };
    for counter in counters {
        if hotp::validate_custom(passcode, counter, secret, hotp_opts)? {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Configuration for [`generate_key`].
#[derive(Debug, Clone)]
pub struct GenerateOpts {
    /// Name of the issuing organization, required
    pub issuer: String,
    /// Name of the user account, required
    pub account_name: String,
    /// Validity window in seconds recorded in the key, 30 unless set
    pub period: u64,
    /// Size of the generated secret in bytes, 10 unless set
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
            period: DEFAULT_PERIOD,
            secret_size: DEFAULT_SECRET_SIZE,
            digits: Digits::default(),
            algorithm: Algorithm::default(),
        }
    }
}

/// Create a new TOTP key with a freshly drawn random secret.
pub fn generate_key(opts: GenerateOpts) -> Result<Key, Error> {
    if opts.issuer.is_empty() {
        return Err(Error::MissingIssuer);
    }
    if opts.account_name.is_empty() {
        return Err(Error::MissingAccountName);
    }

    let period = match opts.period {
        0 => DEFAULT_PERIOD,
        p => p,
    };
    let secret_size = match opts.secret_size {
        0 => DEFAULT_SECRET_SIZE,
        n => n,
    };
    let mut secret = vec![0u8; secret_size];
    rand::rng().fill(secret.as_mut_slice());

    let key = Key::build(
        "totp",
        &opts.issuer,
        &opts.account_name,
        [
            ("secret", base32::RFC4648_NOPAD.encode(&secret)),
            ("issuer", opts.issuer.clone()),
            ("algorithm", opts.algorithm.to_string()),
            ("digits", opts.digits.to_string()),
            ("period", period.to_string()),
        ],
    )?;

    debug!(issuer = %opts.issuer, account = %opts.account_name, "generated new totp key");
    Ok(key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::digits;
    use std::time::Duration;

    // RFC 6238 appendix B secrets: ASCII digit strings of 20, 32 and 64
    // bytes, base32-encoded.
    const SEC_SHA1: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
    const SEC_SHA256: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZA";
    const SEC_SHA512: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNA";

    const RFC6238_VECTORS: [(u64, &str, Algorithm, &str); 18] = [
        (59, "94287082", Algorithm::Sha1, SEC_SHA1),
        (59, "46119246", Algorithm::Sha256, SEC_SHA256),
        (59, "90693936", Algorithm::Sha512, SEC_SHA512),
        (1111111109, "07081804", Algorithm::Sha1, SEC_SHA1),
        (1111111109, "68084774", Algorithm::Sha256, SEC_SHA256),
        (1111111109, "25091201", Algorithm::Sha512, SEC_SHA512),
        (1111111111, "14050471", Algorithm::Sha1, SEC_SHA1),
        (1111111111, "67062674", Algorithm::Sha256, SEC_SHA256),
        (1111111111, "99943326", Algorithm::Sha512, SEC_SHA512),
        (1234567890, "89005924", Algorithm::Sha1, SEC_SHA1),
        (1234567890, "91819424", Algorithm::Sha256, SEC_SHA256),
        (1234567890, "93441116", Algorithm::Sha512, SEC_SHA512),
        (2000000000, "69279037", Algorithm::Sha1, SEC_SHA1),
        (2000000000, "90698825", Algorithm::Sha256, SEC_SHA256),
        (2000000000, "38618901", Algorithm::Sha512, SEC_SHA512),
        (20000000000, "65353130", Algorithm::Sha1, SEC_SHA1),
        (20000000000, "77737706", Algorithm::Sha256, SEC_SHA256),
        (20000000000, "47863826", Algorithm::Sha512, SEC_SHA512),
    ];

    fn at(unix: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(unix)
    }

    #[test]
    fn rfc6238_generate_vectors() {
        for (unix, expected, algorithm, secret) in RFC6238_VECTORS {
            let opts = Options {
                digits: digits::EIGHT,
                algorithm,
                ..Default::default()
            };
            let code = generate_code_custom(secret, at(unix), opts).unwrap();
            assert_eq!(code, expected, "t={unix} {algorithm}");
        }
    }

    #[test]
    fn rfc6238_validate_vectors() {
        for (unix, code, algorithm, secret) in RFC6238_VECTORS {
            let opts = Options {
                digits: digits::EIGHT,
                algorithm,
                ..Default::default()
            };
            assert!(
                validate_custom(code, secret, at(unix), opts).unwrap(),
                "t={unix} {algorithm}"
            );
        }
    }

    #[test]
    fn skew_tolerates_one_window_of_drift() {
        // 1234567890 is an exact window boundary at period 30.
        let t = 1234567890;
        let opts = Options::default();
        let code = generate_code(SEC_SHA1, at(t)).unwrap();

        for drift in [0, 29] {
            assert!(
                validate_custom(&code, SEC_SHA1, at(t + drift), opts).unwrap(),
                "+{drift}s"
            );
            assert!(
                validate_custom(&code, SEC_SHA1, at(t - drift), opts).unwrap(),
                "-{drift}s"
            );
        }
        // One full window ahead is still inside the skew.
        assert!(validate_custom(&code, SEC_SHA1, at(t + 59), opts).unwrap());
        for drift in [61, 90] {
            assert!(
                !validate_custom(&code, SEC_SHA1, at(t + drift), opts).unwrap(),
                "+{drift}s"
            );
            assert!(
                !validate_custom(&code, SEC_SHA1, at(t - drift), opts).unwrap(),
                "-{drift}s"
            );
        }
    }

    #[test]
    fn zero_skew_accepts_only_the_current_window() {
        let t = 1234567890;
        let opts = Options {
            skew: 0,
            ..Default::default()
        };
        let code = generate_code(SEC_SHA1, at(t)).unwrap();
        assert!(validate_custom(&code, SEC_SHA1, at(t + 29), opts).unwrap());
        assert!(!validate_custom(&code, SEC_SHA1, at(t + 31), opts).unwrap());
    }

    #[test]
    fn zero_period_falls_back_to_default() {
        let t = at(1234567890);
        let with_default = generate_code(SEC_SHA1, t).unwrap();
        let with_zero = generate_code_custom(
            SEC_SHA1,
            t,
            Options {
                period: 0,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(with_default, with_zero);
    }

    #[test]
    fn malformed_secret_aborts_the_scan() {
        let result = validate_custom("123456", "not!base32", at(1234567890), Options::default());
        assert!(matches!(result, Err(Error::InvalidBase32)));
    }

    #[test]
    fn generate_key_round_trip() {
        let key = generate_key(GenerateOpts {
            issuer: "Example".into(),
            account_name: "alice@example.com".into(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(key.otp_type(), "totp");
        assert_eq!(key.issuer(), "Example");
        assert_eq!(key.account_name(), "alice@example.com");
        assert_eq!(key.period(), 30);
        // 10 random bytes encode to 16 base32 characters without padding.
        assert_eq!(key.secret().len(), 16);

        let reparsed = Key::from_url(key.url()).unwrap();
        assert_eq!(reparsed.issuer(), key.issuer());
        assert_eq!(reparsed.account_name(), key.account_name());
        assert_eq!(reparsed.secret(), key.secret());
    }

    #[test]
    fn generated_key_validates_its_own_codes() {
        for algorithm in [
            Algorithm::Sha1,
            Algorithm::Sha256,
            Algorithm::Sha512,
            Algorithm::Md5,
        ] {
            let key = generate_key(GenerateOpts {
                issuer: "Example".into(),
                account_name: "alice@example.com".into(),
                algorithm,
                ..Default::default()
            })
            .unwrap();
            let opts = Options {
                algorithm,
                ..Default::default()
            };
            let t = at(1234567890);
            let code = generate_code_custom(&key.secret(), t, opts).unwrap();
            assert!(validate_custom(&code, &key.secret(), t, opts).unwrap());
        }
    }
}
