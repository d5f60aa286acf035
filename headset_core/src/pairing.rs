//! Pairing codes shown by the headset and typed in by the user.
//!
//! A code is exactly four printable characters: letters, digits or ASCII
//! punctuation. User input is trimmed and upper-cased before the length is
//! checked.

use crate::error::ValidationError;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

pub const PAIRING_CODE_LEN: usize = 4;

/// Characters used for generated codes (no 0/O or 1/I to keep them readable)
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairingCode(String);

impl PairingCode {
    /// Normalize user input and validate it as a pairing code
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_uppercase();

        if normalized.chars().count() != PAIRING_CODE_LEN
            || !normalized.chars().all(is_code_char)
        {
            return Err(ValidationError::InvalidPairingCode);
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Compare a raw datagram payload against this code, ignoring ASCII case
    pub fn matches(&self, payload: &[u8]) -> bool {
        payload.eq_ignore_ascii_case(self.as_bytes())
    }
}

/// Whitespace, control and invisible format characters never appear in a code
fn is_code_char(c: char) -> bool {
    c.is_alphanumeric() || c.is_ascii_punctuation()
}

impl FromStr for PairingCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PairingCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generate a random code for a device to display
pub fn generate_pairing_code() -> PairingCode {
    let mut rng = rand::rng();
    let code: String = (0..PAIRING_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    PairingCode(code)
}
