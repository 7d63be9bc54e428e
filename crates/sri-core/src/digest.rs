//! Subresource integrity digests: file content to `<algorithm>-<base64>`.
//!
//! Content is decoded as UTF-8 text before hashing (invalid sequences become
//! U+FFFD), and the base64 digest carries no `=` padding. Both are part of the
//! value format consumers compare against, so they must not change.

use crate::error::DigestError;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Digest algorithm used for integrity values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Sha256,
    Sha512,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Sha256, Algorithm::Sha512];

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha512 => "sha512",
        }
    }

    /// Length of the unpadded base64 digest (43 for 32 bytes, 86 for 64 bytes).
    fn encoded_len(self) -> usize {
        let bytes = match self {
            Algorithm::Sha256 => 32,
            Algorithm::Sha512 => 64,
        };
        (bytes * 4 + 2) / 3
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(Algorithm::Sha256),
            "sha512" => Ok(Algorithm::Sha512),
            other => Err(DigestError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// An integrity value such as `sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntegrityResult {
    algorithm: Algorithm,
    value: String,
}

impl IntegrityResult {
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl fmt::Display for IntegrityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for IntegrityResult {
    type Err = DigestError;

    /// Parse and validate a value produced by `sri-gen` or copied from a sink.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DigestError::MalformedOutput(s.to_string());
        let (tag, body) = s.split_once('-').ok_or_else(malformed)?;
        let algorithm: Algorithm = tag.parse().map_err(|_| malformed())?;
        let alphabet_ok = body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/');
        if !alphabet_ok || body.len() != algorithm.encoded_len() {
            return Err(malformed());
        }
        Ok(IntegrityResult {
            algorithm,
            value: s.to_string(),
        })
    }
}

/// Compute the integrity value of in-memory content.
pub fn integrity_of_bytes(content: &[u8], algorithm: Algorithm) -> IntegrityResult {
    let text = String::from_utf8_lossy(content);
    let digest = match algorithm {
        Algorithm::Sha256 => Sha256::digest(text.as_bytes()).to_vec(),
        Algorithm::Sha512 => Sha512::digest(text.as_bytes()).to_vec(),
    };
    // Unpadded engine: same output as stripping every `=` from standard base64.
    let encoded = STANDARD_NO_PAD.encode(digest);
    IntegrityResult {
        algorithm,
        value: format!("{}-{}", algorithm, encoded),
    }
}

/// Read a file and compute its integrity value.
pub fn integrity_of_path(path: &Path, algorithm: Algorithm) -> Result<IntegrityResult, DigestError> {
    let content = std::fs::read(path).map_err(|e| DigestError::from_read(path, e))?;
    tracing::trace!(path = %path.display(), bytes = content.len(), %algorithm, "hashing file");
    Ok(integrity_of_bytes(&content, algorithm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCRIPT: &[u8] = b"alert('sri');\n";
    const SCRIPT_SHA256: &str = "sha256-iugEoPhbuFTv3nAXBo5ckd08DsAqFESECzSrFaX3bZI";
    const SCRIPT_SHA512: &str = "sha512-eeD0Y6RVVPegFcgA4XfBaUUyu+mv5eGdLex3/fPjhPuaciXYh4cSU9kY1CjhVFwka9ERDwGvJV3vZzJbo47QQQ";

    fn well_formed(value: &str) -> bool {
        let Some((tag, body)) = value.split_once('-') else {
            return false;
        };
        (tag == "sha256" || tag == "sha512")
            && !body.is_empty()
            && body
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
    }

    #[test]
    fn empty_content_known_digests() {
        assert_eq!(
            integrity_of_bytes(b"", Algorithm::Sha256).as_str(),
            "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU"
        );
        assert_eq!(
            integrity_of_bytes(b"", Algorithm::Sha512).as_str(),
            "sha512-z4PhNX7vuL3xVChQ1m2AB9Yg5AULVxXcg/SpIdNs6c5H0NE8XYXysP+DGNKHfuwvY7kxvUdBeoGlODJ6+SfaPg"
        );
    }

    #[test]
    fn script_fixture_digests() {
        assert_eq!(integrity_of_bytes(SCRIPT, Algorithm::Sha256).as_str(), SCRIPT_SHA256);
        assert_eq!(integrity_of_bytes(SCRIPT, Algorithm::Sha512).as_str(), SCRIPT_SHA512);
    }

    #[test]
    fn output_is_unpadded_and_well_formed() {
        let inputs: [&[u8]; 4] = [b"", b"a", b"body { color: red; }\n", SCRIPT];
        for content in inputs {
            for algorithm in Algorithm::ALL {
                let r = integrity_of_bytes(content, algorithm);
                assert!(!r.as_str().contains('='), "{}", r);
                assert!(well_formed(r.as_str()), "{}", r);
                assert_eq!(r.algorithm(), algorithm);
            }
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        let a = integrity_of_bytes(SCRIPT, Algorithm::Sha512);
        let b = integrity_of_bytes(SCRIPT, Algorithm::Sha512);
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_utf8_is_hashed_as_replacement_character() {
        let lossy = integrity_of_bytes(b"a\xffb", Algorithm::Sha256);
        let replaced = integrity_of_bytes("a\u{FFFD}b".as_bytes(), Algorithm::Sha256);
        assert_eq!(lossy, replaced);
        assert_eq!(
            lossy.as_str(),
            "sha256-BQh4Ezku/Bb+j/RIkgxjKOU6+GXfOUGUNmWdn/2pD3s"
        );
    }

    #[test]
    fn path_digest_matches_bytes() {
        let mut f = tempfile::Builder::new().suffix(".css").tempfile().unwrap();
        f.write_all(b"body { color: red; }\n").unwrap();
        f.flush().unwrap();
        assert_eq!(
            integrity_of_path(f.path(), Algorithm::Sha256).unwrap().as_str(),
            "sha256-l2fpHp1LAzTlmh04npgBvGosXEpVAKPCx5FWh5ZbLBY"
        );
        assert_eq!(
            integrity_of_path(f.path(), Algorithm::Sha512).unwrap().as_str(),
            "sha512-S2+7giBtWX0Eg9Q8lr0Mt6huUYAXvYFJuPwL81bMMpNqy90b4nilhh6w5FTzQMecsRmh90MxcC/ML3rEPh+FJA"
        );
    }

    #[test]
    fn missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = integrity_of_path(&dir.path().join("gone.js"), Algorithm::Sha256).unwrap_err();
        assert!(matches!(err, DigestError::NotFound { .. }));
    }

    #[test]
    fn directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = integrity_of_path(dir.path(), Algorithm::Sha256).unwrap_err();
        assert!(matches!(err, DigestError::Unreadable { .. }));
    }

    #[test]
    fn algorithm_parse_and_display() {
        assert_eq!("sha256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("sha512".parse::<Algorithm>().unwrap(), Algorithm::Sha512);
        assert_eq!(Algorithm::Sha512.to_string(), "sha512");
        assert!(matches!(
            "SHA256".parse::<Algorithm>(),
            Err(DigestError::UnsupportedAlgorithm(_))
        ));
        assert!("md5".parse::<Algorithm>().is_err());
    }

    #[test]
    fn integrity_result_parse() {
        let parsed: IntegrityResult = SCRIPT_SHA256.parse().unwrap();
        assert_eq!(parsed.algorithm(), Algorithm::Sha256);
        assert_eq!(parsed, integrity_of_bytes(SCRIPT, Algorithm::Sha256));

        for bad in [
            "",
            "sha256",
            "sha256-",
            "md5-1B2M2Y8AsgTpgAmY7PhCfg",
            "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=",
            "sha512-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU",
            "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuF\n",
        ] {
            assert!(bad.parse::<IntegrityResult>().is_err(), "{:?}", bad);
        }
    }
}
