//! Base16 (hex) text codec over byte buffers, used only for transport and
//! display. Constant-time via `base16ct`; decoding never panics.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Base16Error {
    #[error("invalid base16 text")]
    Invalid,
}

#[must_use]
pub fn encode_lower(bytes: &[u8]) -> String {
    base16ct::lower::encode_string(bytes)
}

#[must_use]
pub fn encode_upper(bytes: &[u8]) -> String {
    base16ct::upper::encode_string(bytes)
}

pub fn decode_lower(text: &str) -> Result<Vec<u8>, Base16Error> {
    base16ct::lower::decode_vec(text).map_err(|_| Base16Error::Invalid)
}

pub fn decode_upper(text: &str) -> Result<Vec<u8>, Base16Error> {
    base16ct::upper::decode_vec(text).map_err(|_| Base16Error::Invalid)
}

/// Case-tolerant decode; accepts any mix of upper and lower nibble digits.
pub fn decode_mixed(text: &str) -> Result<Vec<u8>, Base16Error> {
    base16ct::mixed::decode_vec(text).map_err(|_| Base16Error::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_lower() {
        let bytes = [0xDEu8, 0xAD, 0xBE, 0xEF];
        let text = encode_lower(&bytes);
        assert_eq!(text, "deadbeef");
        assert_eq!(decode_lower(&text).unwrap(), bytes);
    }

    #[test]
    fn mixed_accepts_both_cases() {
        assert_eq!(decode_mixed("DeAdBeEf").unwrap(), [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn strict_decoders_reject_wrong_case() {
        assert_eq!(decode_lower("DEADBEEF"), Err(Base16Error::Invalid));
        assert_eq!(decode_upper("deadbeef"), Err(Base16Error::Invalid));
    }

    #[test]
    fn odd_length_rejected() {
        assert_eq!(decode_mixed("abc"), Err(Base16Error::Invalid));
    }
}
