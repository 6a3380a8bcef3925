use std::borrow::Cow;
use std::fmt;

use url::Url;

use crate::algorithm::Algorithm;
use crate::digits::Digits;
use crate::error::Error;
use crate::totp::DEFAULT_PERIOD;

/// An HOTP or TOTP key as understood by authenticator apps.
///
/// A key wraps an `otpauth://` URI and is read-only after construction. The
/// URI text itself (see [`Key::url`]) is what gets rendered into a QR code;
/// this crate only supplies the payload.
#[derive(Debug, Clone)]
pub struct Key {
    orig: String,
    url: Url,
}

impl Key {
    /// Parse a key from an `otpauth://` URI string.
    ///
    /// Only URI syntax is checked here; the host and query parameters are
    /// returned verbatim by the accessors without further validation.
    pub fn from_url(orig: impl AsRef<str>) -> Result<Self, Error> {
        let s = orig.as_ref().trim();
        let url = Url::parse(s)?;
        Ok(Self {
            orig: s.to_owned(),
            url,
        })
    }

    /// Build a fresh key URI for `generate_key`.
    pub(crate) fn build(
        host: &str,
        issuer: &str,
        account_name: &str,
        params: impl IntoIterator<Item = (&'static str, String)>,
    ) -> Result<Self, Error> {
        let label = format!(
            "{}:{}",
            urlencoding::encode(issuer),
            urlencoding::encode(account_name)
        );
        let mut url = Url::parse(&format!("otpauth://{host}/{label}"))?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, &value);
            }
        }
        Self::from_url(url.as_str())
    }

    /// "hotp" or "totp" (the URI host, verbatim).
    pub fn otp_type(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }

    /// The provider or service the key is associated with.
    ///
    /// Prefers the `issuer` query parameter, falling back to the label
    /// prefix before the first `:`. Empty if neither is present.
    pub fn issuer(&self) -> String {
        if let Some(issuer) = self.query("issuer") {
            return issuer;
        }

        let label = self.label();
        match label.split_once(':') {
            Some((issuer, _)) => issuer.to_owned(),
            None => String::new(),
        }
    }

    /// The user account name, the label part after the first `:` (or the
    /// whole label when there is no issuer prefix).
    pub fn account_name(&self) -> String {
        let label = self.label();
        match label.split_once(':') {
            Some((_, account)) => account.to_owned(),
            None => label.into_owned(),
        }
    }

    /// The shared secret as base32 text, unvalidated.
    pub fn secret(&self) -> String {
        self.query("secret").unwrap_or_default()
    }

    /// The hash algorithm, defaulting to SHA1 when absent or unrecognized.
    pub fn algorithm(&self) -> Algorithm {
        self.query("algorithm")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// The passcode width, defaulting to six digits.
    pub fn digits(&self) -> Digits {
        self.query("digits")
            .and_then(|s| s.parse().ok())
            .map(Digits::new)
            .unwrap_or_default()
    }

    /// The TOTP period in seconds, defaulting to 30.
    pub fn period(&self) -> u64 {
        self.query("period")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PERIOD)
    }

    /// The canonical URI text.
    pub fn url(&self) -> String {
        self.url.to_string()
    }

    fn query(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// The label path segment, percent-decoded.
    fn label(&self) -> Cow<'_, str> {
        let path = self.url.path().trim_start_matches('/');
        urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.orig)
    }
}
