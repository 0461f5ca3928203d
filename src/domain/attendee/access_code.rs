//! Attendee access codes and their stored digests.
//!
//! Plaintext codes exist only when they are handed to the attendee or typed
//! back in. Storage keeps the SHA-256 digest, compared in constant time.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::domain::foundation::ValidationError;

/// Length of generated access codes.
pub const ACCESS_CODE_LEN: usize = 12;

const MAX_ACCESS_CODE_LEN: usize = 64;

// No 0/O or 1/I. 32 symbols so a byte maps uniformly with `% 32`.
const ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

// UUID v4 bytes 6 and 8 carry version and variant bits.
const RANDOM_BYTE_INDICES: [usize; ACCESS_CODE_LEN] = [0, 1, 2, 3, 4, 5, 7, 9, 10, 11, 12, 13];

/// Plaintext access code as presented by an attendee.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessCode(String);

impl AccessCode {
    /// Generates a fresh 12-character upper-case code.
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4();
        let bytes = uuid.as_bytes();
        let code = RANDOM_BYTE_INDICES
            .iter()
            .map(|&i| ALPHABET[(bytes[i] % 32) as usize] as char)
            .collect();
        Self(code)
    }

    /// Parses user input. Codes are case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let code = raw.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(ValidationError::empty_field("access_code"));
        }
        let len = code.chars().count();
        if len > MAX_ACCESS_CODE_LEN {
            return Err(ValidationError::too_long("access_code", MAX_ACCESS_CODE_LEN, len));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn digest(&self) -> AccessCodeDigest {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        AccessCodeDigest(format!("{:x}", hasher.finalize()))
    }
}

// Never print the plaintext.
impl fmt::Debug for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCode(***)")
    }
}

/// Hex-encoded SHA-256 digest of an access code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessCodeDigest(String);

impl AccessCodeDigest {
    /// Wraps a digest loaded from storage.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against a presented code.
    pub fn matches(&self, code: &AccessCode) -> bool {
        let presented = code.digest();
        self.0.as_bytes().ct_eq(presented.0.as_bytes()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_use_unambiguous_alphabet() {
        let code = AccessCode::generate();
        assert_eq!(code.as_str().len(), ACCESS_CODE_LEN);
        assert!(code.as_str().bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn generated_codes_differ() {
        assert_ne!(AccessCode::generate(), AccessCode::generate());
    }

    #[test]
    fn parse_is_case_insensitive() {
        let lower = AccessCode::parse("abcd2345wxyz").unwrap();
        let upper = AccessCode::parse("ABCD2345WXYZ").unwrap();
        assert_eq!(lower.digest(), upper.digest());
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(
            AccessCode::parse("   ").unwrap_err(),
            ValidationError::empty_field("access_code")
        );
    }

    #[test]
    fn digest_is_sha256_hex() {
        let digest = AccessCode::parse("ABC").unwrap().digest();
        assert_eq!(
            digest.as_str(),
            "b5d4045c3f466fa91fe2cc6abe79232a1a57cdf104f7a26e716e0a1e2789df78"
        );
    }

    #[test]
    fn matches_only_the_original_code() {
        let code = AccessCode::parse("K7P2M9QX4RTA").unwrap();
        let digest = code.digest();
        assert!(digest.matches(&code));
        assert!(!digest.matches(&AccessCode::parse("K7P2M9QX4RTB").unwrap()));
    }

    #[test]
    fn debug_output_hides_plaintext() {
        let code = AccessCode::parse("SECRET123").unwrap();
        assert!(!format!("{:?}", code).contains("SECRET123"));
    }
}
