use crate::Block_cypher::{key_from_hex, BlockCypher};
use crate::Confidentiality::DES::{DES, DES_BLOCK_SIZE_BYTES, DES_KEY_SIZE_BYTES};
use crate::error::Result;

/// Two DES keys back to back.
pub const DES_KEY_PAIR_SIZE_BYTES: usize = 2 * DES_KEY_SIZE_BYTES;

type Block = [u8; DES_BLOCK_SIZE_BYTES];
type Key = [u8; DES_KEY_SIZE_BYTES];
type KeyPair = [u8; DES_KEY_PAIR_SIZE_BYTES];

pub fn split_key(keys: &KeyPair) -> (Key, Key) {
    let mut first = [0x00; DES_KEY_SIZE_BYTES];
    let mut second = [0x00; DES_KEY_SIZE_BYTES];
    first.copy_from_slice(&keys[..DES_KEY_SIZE_BYTES]);
    second.copy_from_slice(&keys[DES_KEY_SIZE_BYTES..]);
    (first, second)
}

pub fn join_keys(first: &Key, second: &Key) -> KeyPair {
    let mut keys = [0x00; DES_KEY_PAIR_SIZE_BYTES];
    keys[..DES_KEY_SIZE_BYTES].copy_from_slice(first);
    keys[DES_KEY_SIZE_BYTES..].copy_from_slice(second);
    keys
}

/// Both halves of a DES key pair from hex, each checked for the single key
/// width.
pub fn key_pair_from_hex(first: &str, second: &str) -> Result<KeyPair> {
    Ok(join_keys(&key_from_hex(first)?, &key_from_hex(second)?))
}

/// One DES core under two keys. Encryption is `D(k1, D(k2, x))`, decryption
/// `E(k2, E(k1, y))`.
#[derive(Clone, Debug)]
pub struct DoubleDES {
    des: DES,
}

impl DoubleDES {
    pub fn new(des: DES) -> Self {
        Self { des }
    }

    pub fn des(&self) -> &DES {
        &self.des
    }
}

impl BlockCypher<DES_BLOCK_SIZE_BYTES, DES_KEY_PAIR_SIZE_BYTES> for DoubleDES {
    fn encrypt_block(&self, key: &KeyPair, plain_text_block: &Block) -> Block {
        let (first, second) = split_key(key);
        let once = self.des.decrypt_block(&second, plain_text_block);
        self.des.decrypt_block(&first, &once)
    }

    fn decrypt_block(&self, key: &KeyPair, cypher_text_block: &Block) -> Block {
        let (first, second) = split_key(key);
        let once = self.des.encrypt_block(&first, cypher_text_block);
        self.des.encrypt_block(&second, &once)
    }
}

/// Two-key EDE: `E(k1, D(k2, E(k1, x)))`. Equal keys give plain DES.
#[derive(Clone, Debug)]
pub struct TripleDES {
    des: DES,
}

impl TripleDES {
    pub fn new(des: DES) -> Self {
        Self { des }
    }

    pub fn des(&self) -> &DES {
        &self.des
    }
}

impl BlockCypher<DES_BLOCK_SIZE_BYTES, DES_KEY_PAIR_SIZE_BYTES> for TripleDES {
    fn encrypt_block(&self, key: &KeyPair, plain_text_block: &Block) -> Block {
        let (first, second) = split_key(key);
        let encrypted = self.des.encrypt_block(&first, plain_text_block);
        let decrypted = self.des.decrypt_block(&second, &encrypted);
        self.des.encrypt_block(&first, &decrypted)
    }

    fn decrypt_block(&self, key: &KeyPair, cypher_text_block: &Block) -> Block {
        let (first, second) = split_key(key);
        let decrypted = self.des.decrypt_block(&first, cypher_text_block);
        let encrypted = self.des.encrypt_block(&second, &decrypted);
        self.des.decrypt_block(&first, &encrypted)
    }
}
