use crate::Block_cypher::BlockCypher;

pub const STB_BLOCK_SIZE_BYTES: usize = 16;
pub const STB_KEY_SIZE_BYTES: usize = 32;

const ROUNDS: usize = 8;

/// Byte substitution, row by high nibble and column by low nibble.
#[rustfmt::skip]
pub const STB_SUBSTITUTION_TABLE: [u8; 256] = [
    0xB1, 0x94, 0xBA, 0xC8, 0x0A, 0x08, 0xF5, 0x3B, 0x36, 0x6D, 0x00, 0x8E, 0x58, 0x4A, 0x5D, 0xE4,
    0x85, 0x04, 0xFA, 0x9D, 0x1B, 0xB6, 0xC7, 0xAC, 0x25, 0x2E, 0x72, 0xC2, 0x02, 0xFD, 0xCE, 0x0D,
    0x5B, 0xE3, 0xD6, 0x12, 0x17, 0xB9, 0x61, 0x81, 0xFE, 0x67, 0x86, 0xAD, 0x71, 0x6B, 0x89, 0x0B,
    0x5C, 0xB0, 0xC0, 0xFF, 0x33, 0xC3, 0x56, 0xB8, 0x35, 0xC4, 0x05, 0xAE, 0xD8, 0xE0, 0x7F, 0x99,
    0xE1, 0x2B, 0xDC, 0x1A, 0xE2, 0x82, 0x57, 0xEC, 0x70, 0x3F, 0xCC, 0xF0, 0x95, 0xEE, 0x8D, 0xF1,
    0xC1, 0xAB, 0x76, 0x38, 0x9F, 0xE6, 0x78, 0xCA, 0xF7, 0xC6, 0xF8, 0x60, 0xD5, 0xBB, 0x9C, 0x4F,
    0xF3, 0x3C, 0x65, 0x7B, 0x63, 0x7C, 0x30, 0x6A, 0xDD, 0x4E, 0xA7, 0x79, 0x9E, 0xB2, 0x3D, 0x31,
    0x3E, 0x98, 0xB5, 0x6E, 0x27, 0xD3, 0xBC, 0xCF, 0x59, 0x1E, 0x18, 0x1F, 0x4C, 0x5A, 0xB7, 0x93,
    0xE9, 0xDE, 0xE7, 0x2C, 0x8F, 0x0C, 0x0F, 0xA6, 0x2D, 0xDB, 0x49, 0xF4, 0x6F, 0x73, 0x96, 0x47,
    0x06, 0x07, 0x53, 0x16, 0xED, 0x24, 0x7A, 0x37, 0x39, 0xCB, 0xA3, 0x83, 0x03, 0xA9, 0x8B, 0xF6,
    0x92, 0xBD, 0x9B, 0x1C, 0xE5, 0xD1, 0x41, 0x01, 0x54, 0x45, 0xFB, 0xC9, 0x5E, 0x4D, 0x0E, 0xF2,
    0x68, 0x20, 0x80, 0xAA, 0x22, 0x7D, 0x64, 0x2F, 0x26, 0x87, 0xF9, 0x34, 0x90, 0x40, 0x55, 0x11,
    0xBE, 0x32, 0x97, 0x13, 0x43, 0xFC, 0x9A, 0x48, 0xA0, 0x2A, 0x88, 0x5F, 0x19, 0x4B, 0x09, 0xA1,
    0x7E, 0xCD, 0xA4, 0xD0, 0x15, 0x44, 0xAF, 0x8C, 0xA5, 0x84, 0x50, 0xBF, 0x66, 0xD2, 0xE8, 0x8A,
    0xA2, 0xD7, 0x46, 0x52, 0x42, 0xA8, 0xDF, 0xB3, 0x69, 0x74, 0xC5, 0x51, 0xEB, 0x23, 0x29, 0x21,
    0xD4, 0xEF, 0xD9, 0xB4, 0x3A, 0x62, 0x28, 0x75, 0x91, 0x14, 0x10, 0xEA, 0x77, 0x6C, 0xDA, 0x1D,
];

fn substitute(word: u32) -> u32 {
    u32::from_be_bytes(word.to_be_bytes().map(|byte| STB_SUBSTITUTION_TABLE[byte as usize]))
}

/// Doubling mod 2^32 with the carried out top bit fed back in, `r` times.
/// That is a left rotation by `r`.
pub fn lambda(word: u32, r: u32) -> u32 {
    word.rotate_left(r)
}

fn g(word: u32, r: u32) -> u32 {
    lambda(substitute(word), r)
}

fn key_words(key: &[u8; STB_KEY_SIZE_BYTES]) -> [u32; 8] {
    let mut words = [0u32; 8];
    for (word, bytes) in words.iter_mut().zip(key.chunks_exact(4)) {
        *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    words
}

// word 7*round - back, wrapped into the eight key words
fn key_word(words: &[u32; 8], round: usize, back: usize) -> u32 {
    words[(7 * round + 8 - back) % 8]
}

fn registers(block: &[u8; STB_BLOCK_SIZE_BYTES]) -> [u32; 4] {
    let mut registers = [0u32; 4];
    for (register, bytes) in registers.iter_mut().zip(block.chunks_exact(4)) {
        *register = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    registers
}

fn block(words: [u32; 4]) -> [u8; STB_BLOCK_SIZE_BYTES] {
    let mut block = [0x00; STB_BLOCK_SIZE_BYTES];
    for (bytes, word) in block.chunks_exact_mut(4).zip(words) {
        bytes.copy_from_slice(&word.to_be_bytes());
    }
    block
}

/// STB 34.101.31 shaped substitution-permutation network over four 32 bit
/// registers. Eight rounds, 128 bit block, 256 bit key, one fixed table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct STB;

impl STB {
    pub fn new() -> Self {
        STB
    }
}

impl BlockCypher<STB_BLOCK_SIZE_BYTES, STB_KEY_SIZE_BYTES> for STB {
    fn encrypt_block(&self, key: &[u8; STB_KEY_SIZE_BYTES], plain_text_block: &[u8; STB_BLOCK_SIZE_BYTES]) -> [u8; STB_BLOCK_SIZE_BYTES] {
        let words = key_words(key);
        let [mut a, mut b, mut c, mut d] = registers(plain_text_block);
        for round in 0..ROUNDS {
            b ^= g(a.wrapping_add(key_word(&words, round, 6)), 5);
            c ^= g(d.wrapping_add(key_word(&words, round, 5)), 21);
            a = a.wrapping_sub(g(b.wrapping_add(key_word(&words, round, 4)), 13));
            let e = g(b.wrapping_add(c).wrapping_add(key_word(&words, round, 3)), 21) ^ (round as u32 + 1);
            b = b.wrapping_add(e);
            c = c.wrapping_sub(e);
            d = d.wrapping_add(g(c.wrapping_add(key_word(&words, round, 2)), 13));
            b ^= g(a.wrapping_add(key_word(&words, round, 1)), 21);
            c ^= g(d.wrapping_add(key_word(&words, round, 0)), 5);
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut c, &mut d);
            std::mem::swap(&mut b, &mut c);
        }
        block([b, d, a, c])
    }

    fn decrypt_block(&self, key: &[u8; STB_KEY_SIZE_BYTES], cypher_text_block: &[u8; STB_BLOCK_SIZE_BYTES]) -> [u8; STB_BLOCK_SIZE_BYTES] {
        let words = key_words(key);
        let [mut a, mut b, mut c, mut d] = registers(cypher_text_block);
        for round in (0..ROUNDS).rev() {
            b ^= g(a.wrapping_add(key_word(&words, round, 0)), 5);
            c ^= g(d.wrapping_add(key_word(&words, round, 1)), 21);
            a = a.wrapping_sub(g(b.wrapping_add(key_word(&words, round, 2)), 13));
            let e = g(b.wrapping_add(c).wrapping_add(key_word(&words, round, 3)), 21) ^ (round as u32 + 1);
            b = b.wrapping_add(e);
            c = c.wrapping_sub(e);
            d = d.wrapping_add(g(c.wrapping_add(key_word(&words, round, 4)), 13));
            b ^= g(a.wrapping_add(key_word(&words, round, 5)), 21);
            c ^= g(d.wrapping_add(key_word(&words, round, 6)), 5);
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut c, &mut d);
            std::mem::swap(&mut a, &mut d);
        }
        block([c, a, d, b])
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
mod STB_tests {
    use super::*;
    use crate::Bits::BitBuffer;
    use crate::Block_cypher::{BlockCipherEngine, KeyedCypher};
    use const_hex::const_decode_to_array;
    use rand::prelude::*;

    #[test]
    fn zero_vector_test() {
        let stb = STB::new();
        let expected: [u8; 16] = const_decode_to_array(b"b98dab26537343932b66d0fa92f5656c").unwrap();
        let cypher_text = stb.encrypt_block(&[0; 32], &[0; 16]);
        assert_eq!(cypher_text, expected);
        assert_eq!(stb.decrypt_block(&[0; 32], &cypher_text), [0; 16]);
    }

    #[test]
    fn counting_key_vector_test() {
        let stb = STB::new();
        let mut key = [0u8; 32];
        key.iter_mut().enumerate().for_each(|(i, b)| *b = i as u8);
        let plain: [u8; 16] = const_decode_to_array(b"00112233445566778899aabbccddeeff").unwrap();
        let expected: [u8; 16] = const_decode_to_array(b"51a34a374565ff5d0a292ca5ba900790").unwrap();
        assert_eq!(stb.encrypt_block(&key, &plain), expected);
        assert_eq!(stb.decrypt_block(&key, &expected), plain);
    }

    #[test]
    fn random_round_trip_test() {
        let stb = STB::new();
        let mut rng = StdRng::seed_from_u64(3410131);
        for _ in 0..128 {
            let key: [u8; 32] = rng.gen();
            let block: [u8; 16] = rng.gen();
            let cypher_text = stb.encrypt_block(&key, &block);
            assert_ne!(cypher_text, block);
            assert_eq!(stb.decrypt_block(&key, &cypher_text), block);
        }
    }

    #[test]
    fn lambda_is_doubling_with_carry_test() {
        fn double_with_carry(word: u32) -> u32 {
            let doubled = word.wrapping_mul(2);
            if word & 0x8000_0000 != 0 {
                doubled | 1
            } else {
                doubled
            }
        }
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..64 {
            let word: u32 = rng.gen();
            for r in [5, 13, 21] {
                let doubled = (0..r).fold(word, |acc, _| double_with_carry(acc));
                assert_eq!(lambda(word, r), doubled);
            }
        }
    }

    #[test]
    fn substitution_test() {
        assert_eq!(substitute(0x0000_0000), 0xb1b1_b1b1);
        assert_eq!(substitute(0x0f10_ff01), 0xe485_1d94);
        assert_eq!(g(0, 5), 0xb1b1_b1b1u32.rotate_left(5));
    }

    #[test]
    fn key_word_wraps_test() {
        let words = [0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(key_word(&words, 0, 6), 2);
        assert_eq!(key_word(&words, 0, 0), 0);
        assert_eq!(key_word(&words, 1, 0), 7);
        assert_eq!(key_word(&words, 7, 3), 6);
    }

    #[test]
    fn engine_test() {
        let message = BitBuffer::from_bytes(b"sixteen byte blocks, four registers");
        let mut keyed = KeyedCypher::new(STB::new(), [0x5a; 32]);
        let cypher_text = keyed.encrypt(&message);
        assert_eq!(cypher_text.len(), 3 * 128);
        assert_eq!(keyed.decrypt(&cypher_text, Some(message.len())).unwrap(), message);

        keyed.change_key([0xa5; 32]);
        assert!(keyed.decrypt(&cypher_text, Some(message.len())).unwrap() != message);
        assert_eq!(
            STB::new().decrypt(&[0x5a; 32], &cypher_text, Some(message.len())).unwrap(),
            message
        );
    }
}
