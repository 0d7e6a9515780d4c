use crate::Bits::check_selection;
use crate::Block_cypher::BlockCypher;
use crate::Feistel_network::{classic_feistel_network_decrypt, classic_feistel_network_encrypt};
use crate::error::{CipherError, Result};

pub const GOST_BLOCK_SIZE_BYTES: usize = 8;
pub const GOST_KEY_SIZE_BYTES: usize = 32;

const ROUNDS: usize = 32;

/// One nibble box per nibble of the round input, box 0 for the most
/// significant nibble.
pub type GOSTSBox = [[u8; 16]; 8];

pub const GOST_DEFAULT_S_BOX: GOSTSBox = [
    [10, 4, 9, 2, 13, 8, 0, 14, 6, 11, 1, 12, 7, 15, 5, 3],
    [14, 11, 4, 12, 6, 13, 15, 10, 2, 3, 8, 1, 0, 7, 5, 9],
    [5, 8, 1, 13, 10, 3, 4, 2, 14, 15, 12, 7, 6, 0, 9, 11],
    [7, 13, 10, 1, 0, 8, 9, 15, 14, 4, 6, 12, 11, 2, 5, 3],
    [6, 12, 7, 1, 5, 15, 13, 8, 4, 10, 9, 14, 0, 3, 11, 2],
    [4, 11, 10, 0, 7, 2, 1, 13, 3, 6, 8, 5, 9, 12, 15, 14],
    [13, 11, 4, 1, 3, 15, 5, 9, 0, 10, 14, 7, 6, 8, 2, 12],
    [1, 15, 13, 0, 5, 7, 10, 4, 9, 2, 3, 14, 6, 11, 8, 12],
];

/// GOST 28147-89 shaped Feistel cypher, 64 bit block and 256 bit key.
///
/// Runs the 32 round schedule: subkeys K0..K7 three times, then K7..K0, with
/// no swap after the last round. Decryption walks the same sequence backwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GOST {
    s_box: GOSTSBox,
}

impl Default for GOST {
    fn default() -> Self {
        Self {
            s_box: GOST_DEFAULT_S_BOX,
        }
    }
}

impl GOST {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_s_box(s_box: GOSTSBox) -> Result<Self> {
        for row in s_box.iter() {
            check_selection::<16>("s_box", row, 16)?;
        }
        Ok(Self { s_box })
    }

    /// Same as [`GOST::with_s_box`] for tables of unchecked shape.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        if rows.len() != 8 {
            return Err(CipherError::InvalidTableLength {
                name: "s_box",
                expected: 8,
                actual: rows.len(),
            });
        }
        let mut s_box = [[0u8; 16]; 8];
        for (row, supplied) in s_box.iter_mut().zip(rows) {
            *row = check_selection("s_box", supplied, 16)?;
        }
        Ok(Self { s_box })
    }

    fn substitute(&self, word: u32) -> u32 {
        self.s_box.iter().enumerate().fold(0, |acc, (i, row)| {
            let nibble = (word >> (28 - 4 * i)) & 0x0f;
            (acc << 4) | row[nibble as usize] as u32
        })
    }

    pub fn round_function(&self, right: u32, subkey: u32) -> u32 {
        self.substitute(right.wrapping_add(subkey)).rotate_left(11)
    }

    pub fn subkeys(key: &[u8; GOST_KEY_SIZE_BYTES]) -> [u32; 8] {
        let mut subkeys = [0u32; 8];
        for (subkey, bytes) in subkeys.iter_mut().zip(key.chunks_exact(4)) {
            *subkey = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        subkeys
    }

    /// Subkeys in the order the encryption rounds use them.
    pub fn key_sequence(key: &[u8; GOST_KEY_SIZE_BYTES]) -> [u32; ROUNDS] {
        let subkeys = Self::subkeys(key);
        let mut sequence = [0u32; ROUNDS];
        for (round, subkey) in sequence.iter_mut().enumerate() {
            *subkey = match round {
                r if r < 24 => subkeys[r % 8],
                r => subkeys[31 - r],
            };
        }
        sequence
    }
}

fn halves(block: &[u8; GOST_BLOCK_SIZE_BYTES]) -> (u32, u32) {
    let word = u64::from_be_bytes(*block);
    ((word >> 32) as u32, word as u32)
}

fn join(high: u32, low: u32) -> [u8; GOST_BLOCK_SIZE_BYTES] {
    (((high as u64) << 32) | low as u64).to_be_bytes()
}

impl BlockCypher<GOST_BLOCK_SIZE_BYTES, GOST_KEY_SIZE_BYTES> for GOST {
    fn encrypt_block(&self, key: &[u8; GOST_KEY_SIZE_BYTES], plain_text_block: &[u8; GOST_BLOCK_SIZE_BYTES]) -> [u8; GOST_BLOCK_SIZE_BYTES] {
        let (left, right) = halves(plain_text_block);
        let (left, right) = classic_feistel_network_encrypt(
            left,
            right,
            &Self::key_sequence(key),
            |half, subkey| self.round_function(half, *subkey),
        );
        // last round without swap
        join(right, left)
    }

    fn decrypt_block(&self, key: &[u8; GOST_KEY_SIZE_BYTES], cypher_text_block: &[u8; GOST_BLOCK_SIZE_BYTES]) -> [u8; GOST_BLOCK_SIZE_BYTES] {
        let (right, left) = halves(cypher_text_block);
        let (left, right) = classic_feistel_network_decrypt(
            right,
            left,
            &Self::key_sequence(key),
            |half, subkey| self.round_function(half, *subkey),
        );
        join(left, right)
    }
}

/*
-
-
-                   TESTING
-
-
-
- */
#[cfg(test)]
mod GOST_tests {
    use super::*;
    use crate::Bits::BitBuffer;
    use crate::Block_cypher::{BlockCipherEngine, KeyedCypher};
    use const_hex::const_decode_to_array;
    use rand::prelude::*;

    fn counting_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        key.iter_mut().enumerate().for_each(|(i, b)| *b = i as u8);
        key
    }

    #[test]
    fn fixed_vector_test() {
        let gost = GOST::new();
        let plain: [u8; 8] = const_decode_to_array(b"0123456789abcdef").unwrap();
        let expected: [u8; 8] = const_decode_to_array(b"fd99b713dd2a7999").unwrap();
        assert_eq!(gost.encrypt_block(&counting_key(), &plain), expected);
        assert_eq!(gost.decrypt_block(&counting_key(), &expected), plain);

        let zero: [u8; 8] = const_decode_to_array(b"565c41e3b0b192c8").unwrap();
        assert_eq!(gost.encrypt_block(&[0; 32], &[0; 8]), zero);
    }

    /// The schedule is the mirrored textbook one, so decryption inverts
    /// encryption for every key.
    #[test]
    fn mirrored_schedule_round_trips_test() {
        let gost = GOST::new();
        let mut rng = StdRng::seed_from_u64(28147);
        for _ in 0..128 {
            let key: [u8; 32] = rng.gen();
            let block: [u8; 8] = rng.gen();
            assert_eq!(gost.decrypt_block(&key, &gost.encrypt_block(&key, &block)), block);
        }
    }

    #[test]
    fn key_sequence_test() {
        let sequence = GOST::key_sequence(&counting_key());
        let subkeys = GOST::subkeys(&counting_key());
        assert_eq!(subkeys[0], 0x0001_0203);
        assert_eq!(subkeys[7], 0x1c1d_1e1f);
        assert_eq!(&sequence[..8], &subkeys);
        assert_eq!(&sequence[8..16], &subkeys);
        assert_eq!(&sequence[16..24], &subkeys);
        let reversed: Vec<u32> = subkeys.iter().rev().copied().collect();
        assert_eq!(&sequence[24..], reversed.as_slice());
    }

    #[test]
    fn round_function_test() {
        let gost = GOST::new();
        // 0 + 0 substitutes to the first column of every box
        let substituted = 0xae57_64d1u32;
        assert_eq!(gost.round_function(0, 0), substituted.rotate_left(11));
        // the addition wraps
        assert_eq!(gost.round_function(0xffff_ffff, 1), gost.round_function(0, 0));
    }

    #[test]
    fn custom_s_box_test() {
        let mut identity = [[0u8; 16]; 8];
        identity
            .iter_mut()
            .for_each(|row| row.iter_mut().enumerate().for_each(|(i, e)| *e = i as u8));
        let gost = GOST::with_s_box(identity).unwrap();
        assert_eq!(gost.round_function(0x0000_0001, 0x0000_0002), 3u32.rotate_left(11));
        assert_ne!(gost, GOST::default());

        let mut broken = GOST_DEFAULT_S_BOX;
        broken[4][4] = 0x10;
        assert!(matches!(
            GOST::with_s_box(broken),
            Err(CipherError::TableEntryOutOfRange { position: 4, value: 16, .. })
        ));
        assert!(matches!(
            GOST::from_rows(&vec![vec![0; 16]; 7]),
            Err(CipherError::InvalidTableLength { expected: 8, actual: 7, .. })
        ));
        assert!(matches!(
            GOST::from_rows(&[vec![0; 15]].into_iter().chain(vec![vec![0; 16]; 7]).collect::<Vec<_>>()),
            Err(CipherError::InvalidTableLength { expected: 16, actual: 15, .. })
        ));
        let rows: Vec<Vec<u8>> = GOST_DEFAULT_S_BOX.iter().map(|row| row.to_vec()).collect();
        assert_eq!(GOST::from_rows(&rows).unwrap(), GOST::default());
    }

    #[test]
    fn engine_test() {
        let message = BitBuffer::from_bytes(b"Magma or not, it is a Feistel net");
        let keyed = KeyedCypher::with_bit_key(GOST::new(), &BitBuffer::from_bytes(&counting_key())).unwrap();
        let cypher_text = keyed.encrypt(&message);
        assert_eq!(cypher_text.len(), 320);
        assert_eq!(keyed.decrypt(&cypher_text, Some(message.len())).unwrap(), message);
        assert!(KeyedCypher::with_bit_key(GOST::new(), &BitBuffer::zeros(255)).is_err());
        assert_eq!(
            GOST::new().encrypt_bits_block(&[0; 32], &BitBuffer::zeros(64)).unwrap().as_bytes(),
            &const_decode_to_array::<8>(b"565c41e3b0b192c8").unwrap()
        );
    }
}
