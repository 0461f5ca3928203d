//! Public event code value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::ValidationError;

const EVENT_CODE_LEN: usize = 8;

/// Public, shareable code identifying an event: 8 upper-case hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventCode(String);

impl EventCode {
    /// Generates a fresh random code.
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(simple[..EVENT_CODE_LEN].to_ascii_uppercase())
    }

    /// Parses a code, accepting lower-case input.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let code = raw.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(ValidationError::empty_field("event_code"));
        }
        if code.len() != EVENT_CODE_LEN || !code.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::invalid_format(
                "event_code",
                "expected 8 hexadecimal characters",
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EventCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EventCode> for String {
    fn from(code: EventCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_upper_hex() {
        let code = EventCode::generate();
        assert_eq!(code.as_str().len(), 8);
        assert!(code
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn parse_normalizes_case() {
        assert_eq!(EventCode::parse(" a1b2c3d4 ").unwrap().as_str(), "A1B2C3D4");
    }

    #[test]
    fn parse_rejects_wrong_length_or_alphabet() {
        assert!(EventCode::parse("A1B2C3").is_err());
        assert!(EventCode::parse("ZZZZZZZZ").is_err());
        assert!(EventCode::parse("").is_err());
    }
}
