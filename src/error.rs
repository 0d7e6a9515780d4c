use thiserror::Error;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("table `{name}` must have {expected} entries, got {actual}")]
    InvalidTableLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("table `{name}` has entry {value} at position {position}, expected a value below {bound}")]
    TableEntryOutOfRange {
        name: &'static str,
        position: usize,
        value: u8,
        bound: usize,
    },

    #[error("table `{name}` is not a permutation, {value} appears more than once")]
    NotAPermutation { name: &'static str, value: u8 },

    #[error("invalid key length `{actual}` bits, expected `{expected}` bits")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid block length `{actual}` bits, expected `{expected}` bits")]
    InvalidBlockLength { expected: usize, actual: usize },

    #[error("ciphertext of `{length}` bits leaves `{remainder}` bits past the last `{block}` bit block")]
    TrailingCiphertextBits {
        length: usize,
        block: usize,
        remainder: usize,
    },

    #[error("original length `{original}` bits exceeds the `{available}` decrypted bits")]
    OriginalLengthTooLong { original: usize, available: usize },

    #[error("malformed parameter file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("key is not valid hex: {0}")]
    InvalidHex(#[from] const_hex::FromHexError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CipherError>;

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn display_test() {
        let err = CipherError::InvalidKeyLength {
            expected: 56,
            actual: 64,
        };
        assert_eq!(
            err.to_string(),
            "invalid key length `64` bits, expected `56` bits"
        );
        let err = CipherError::NotAPermutation {
            name: "initial_permutation",
            value: 3,
        };
        assert_eq!(
            err.to_string(),
            "table `initial_permutation` is not a permutation, 3 appears more than once"
        );
    }

    #[test]
    fn hex_conversion_test() {
        let err: CipherError = const_hex::decode("0g").unwrap_err().into();
        assert!(matches!(err, CipherError::InvalidHex(_)));
        assert!(err.to_string().starts_with("key is not valid hex"));
    }

    #[test]
    fn io_conversion_test() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CipherError = io.into();
        assert!(matches!(err, CipherError::Io(_)));
        assert_eq!(err.to_string(), "missing");
    }
}
