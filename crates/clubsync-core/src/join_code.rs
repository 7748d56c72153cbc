//! # Join Codes
//!
//! A join code is the 8-character token a prospective member enters to ask
//! to join a club. Codes are drawn uniformly from `A-Z0-9` and are compared
//! case-insensitively: [`JoinCode::parse`] trims and uppercases its input.
//!
//! Uniqueness across clubs is not a property of the value itself; the store
//! that assigns codes enforces it.

use rand_core::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Alphabet join codes are drawn from.
pub const JOIN_CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of characters in a join code.
pub const JOIN_CODE_LEN: usize = 8;

/// Largest multiple of the alphabet size (36 * 7) that fits in a byte. Bytes
/// at or above it are discarded so every character is equally likely.
const REJECTION_BOUND: u8 = 252;

/// A validated club join code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", schema(value_type = String, example = "K7Q2XM9A"))]
#[serde(try_from = "String", into = "String")]
pub struct JoinCode(String);

impl JoinCode {
    /// Generate a fresh random code.
    pub fn generate<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut code = String::with_capacity(JOIN_CODE_LEN);
        let mut buf = [0u8; 16];
        while code.len() < JOIN_CODE_LEN {
            rng.fill_bytes(&mut buf);
            for b in buf {
                if b < REJECTION_BOUND && code.len() < JOIN_CODE_LEN {
                    let idx = usize::from(b) % JOIN_CODE_ALPHABET.len();
                    code.push(char::from(JOIN_CODE_ALPHABET[idx]));
                }
            }
        }
        Self(code)
    }

    /// Parse user input into a join code.
    ///
    /// Surrounding whitespace is ignored and lowercase letters are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidJoinCode`] unless the normalized
    /// input is exactly 8 characters from `A-Z0-9`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let valid = normalized.len() == JOIN_CODE_LEN
            && normalized.bytes().all(|b| JOIN_CODE_ALPHABET.contains(&b));
        if valid {
            Ok(Self(normalized))
        } else {
            Err(ValidationError::InvalidJoinCode(input.to_string()))
        }
    }

    /// Access the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JoinCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<JoinCode> for String {
    fn from(code: JoinCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for JoinCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand_core::OsRng;

    /// Deterministic RNG yielding a fixed byte sequence, cycling.
    struct ScriptedRng {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            let mut b = [0u8; 4];
            self.fill_bytes(&mut b);
            u32::from_le_bytes(b)
        }

        fn next_u64(&mut self) -> u64 {
            let mut b = [0u8; 8];
            self.fill_bytes(&mut b);
            u64::from_le_bytes(b)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for d in dest {
                *d = self.bytes[self.pos % self.bytes.len()];
                self.pos += 1;
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn generated_codes_are_valid() {
        for _ in 0..200 {
            let code = JoinCode::generate(&mut OsRng);
            assert_eq!(code.as_str().len(), JOIN_CODE_LEN);
            assert_eq!(JoinCode::parse(code.as_str()).unwrap(), code);
        }
    }

    #[test]
    fn bytes_above_rejection_bound_are_skipped() {
        // 255 is discarded; 0 maps to 'A', 26 maps to '0'.
        let mut rng = ScriptedRng {
            bytes: vec![255, 0, 26],
            pos: 0,
        };
        let code = JoinCode::generate(&mut rng);
        assert_eq!(code.as_str().len(), JOIN_CODE_LEN);
        assert!(code.as_str().chars().all(|c| c == 'A' || c == '0'));
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let code = JoinCode::parse("  ab12cd34 ").unwrap();
        assert_eq!(code.as_str(), "AB12CD34");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(JoinCode::parse("ABC").is_err());
        assert!(JoinCode::parse("ABCDEFGHJ").is_err());
        assert!(JoinCode::parse("").is_err());
    }

    #[test]
    fn parse_rejects_symbols() {
        let err = JoinCode::parse("AB-2CD34").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidJoinCode(_)));
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let code: JoinCode = serde_json::from_str("\"zz99yy88\"").unwrap();
        assert_eq!(code.as_str(), "ZZ99YY88");
        assert!(serde_json::from_str::<JoinCode>("\"short\"").is_err());
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"ZZ99YY88\"");
    }

    proptest! {
        #[test]
        fn any_rng_stream_yields_a_parseable_code(bytes in proptest::collection::vec(0u8..=251, 1..64)) {
            let mut rng = ScriptedRng { bytes, pos: 0 };
            let code = JoinCode::generate(&mut rng);
            prop_assert!(JoinCode::parse(code.as_str()).is_ok());
        }

        #[test]
        fn parse_accepts_exactly_the_alphabet(s in "[a-zA-Z0-9]{8}") {
            let code = JoinCode::parse(&s).unwrap();
            prop_assert_eq!(code.as_str(), s.to_ascii_uppercase());
        }
    }
}
