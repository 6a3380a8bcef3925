use std::fmt;
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha256, Sha512};

/// The hash function used when computing an HMAC over the moving factor.
///
/// SHA1 is the default of every deployed authenticator app; the other
/// variants exist for callers whose provisioning side asked for them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// HMAC-SHA1 (RFC 4226 default), 20 byte digest
    #[default]
    Sha1,
    /// HMAC-SHA256, 32 byte digest
    Sha256,
    /// HMAC-SHA512, 64 byte digest
    Sha512,
    /// HMAC-MD5, 16 byte digest
    Md5,
}

impl Algorithm {
    /// Compute the HMAC of `data` under `key` with this algorithm.
    ///
    /// Every call builds a fresh MAC context; nothing is retained between
    /// invocations.
    pub(crate) fn sign(self, key: &[u8], data: &[u8]) -> Vec<u8> {
        match self {
            Algorithm::Sha1 => hmac_sum::<Hmac<Sha1>>(key, data),
            Algorithm::Sha256 => hmac_sum::<Hmac<Sha256>>(key, data),
            Algorithm::Sha512 => hmac_sum::<Hmac<Sha512>>(key, data),
            Algorithm::Md5 => hmac_sum::<Hmac<Md5>>(key, data),
        }
    }
}

fn hmac_sum<M: Mac + KeyInit>(key: &[u8], data: &[u8]) -> Vec<u8> {
    // SAFE: HMAC accepts keys of any length.
    #[allow(clippy::unwrap_used)]
    let mut mac = <M as Mac>::new_from_slice(key).unwrap();
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Sha1 => "SHA1",
            Algorithm::Sha256 => "SHA256",
            Algorithm::Sha512 => "SHA512",
            Algorithm::Md5 => "MD5",
        })
    }
}

impl FromStr for Algorithm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHA1" => Ok(Algorithm::Sha1),
            "SHA256" => Ok(Algorithm::Sha256),
            "SHA512" => Ok(Algorithm::Sha512),
            "MD5" => Ok(Algorithm::Md5),
            _ => Err(()),
        }
    }
}
