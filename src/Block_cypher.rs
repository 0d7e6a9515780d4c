use std::fs;
use std::path::Path;

use rayon::prelude::*;
use zeroize::Zeroizing;

use crate::error::{CipherError, Result};
use crate::Bits::BitBuffer;

/// A fixed-width block transform. The key is handed in on every call, so an
/// implementor only holds its (immutable) parameter tables.
pub trait BlockCypher<const BLOCK_SIZE_BYTES: usize, const KEY_SIZE_BYTES: usize> {
    const BLOCK_SIZE_BITS: usize = BLOCK_SIZE_BYTES * 8;
    const KEY_SIZE_BITS: usize = KEY_SIZE_BYTES * 8;

    fn encrypt_block(
        &self,
        key: &[u8; KEY_SIZE_BYTES],
        plain_text_block: &[u8; BLOCK_SIZE_BYTES],
    ) -> [u8; BLOCK_SIZE_BYTES];
    fn decrypt_block(
        &self,
        key: &[u8; KEY_SIZE_BYTES],
        cypher_text_block: &[u8; BLOCK_SIZE_BYTES],
    ) -> [u8; BLOCK_SIZE_BYTES];
}

pub fn key_from_bits<const KEY_SIZE_BYTES: usize>(key: &BitBuffer) -> Result<[u8; KEY_SIZE_BYTES]> {
    key.to_byte_array()
        .ok_or(CipherError::InvalidKeyLength {
            expected: KEY_SIZE_BYTES * 8,
            actual: key.len(),
        })
}

/// Parses a hex key, with or without a `0x` prefix.
pub fn key_from_hex<const KEY_SIZE_BYTES: usize>(hex: &str) -> Result<[u8; KEY_SIZE_BYTES]> {
    key_from_bits(&BitBuffer::from(const_hex::decode(hex)?))
}

fn zero_padded_block<const BLOCK_SIZE_BYTES: usize>(chunk: &[u8]) -> [u8; BLOCK_SIZE_BYTES] {
    let mut block = [0x00; BLOCK_SIZE_BYTES];
    block[..chunk.len()].copy_from_slice(chunk);
    block
}

fn exact_block<const BLOCK_SIZE_BYTES: usize>(chunk: &[u8]) -> Result<[u8; BLOCK_SIZE_BYTES]> {
    <[u8; BLOCK_SIZE_BYTES]>::try_from(chunk).map_err(|_| CipherError::InvalidBlockLength {
        expected: BLOCK_SIZE_BYTES * 8,
        actual: chunk.len() * 8,
    })
}

/// Electronic-codebook style driver over independent blocks.
///
/// A trailing partial block is zero-extended before encryption and nothing
/// records the padding, so `decrypt` takes the original bit length to cut it
/// off again. Ciphertext that does not split into whole blocks is rejected.
pub trait BlockCipherEngine<const BLOCK_SIZE_BYTES: usize, const KEY_SIZE_BYTES: usize>
where
    Self: BlockCypher<BLOCK_SIZE_BYTES, KEY_SIZE_BYTES> + Sync,
{
    fn encrypt(&self, key: &[u8; KEY_SIZE_BYTES], message: &BitBuffer) -> BitBuffer {
        let padding = (BLOCK_SIZE_BYTES * 8 - message.len() % (BLOCK_SIZE_BYTES * 8))
            % (BLOCK_SIZE_BYTES * 8);
        log::debug!(
            "encrypting {} bits in {} byte blocks, {} padding bits",
            message.len(),
            BLOCK_SIZE_BYTES,
            padding
        );
        let cypher_text: Vec<[u8; BLOCK_SIZE_BYTES]> = message
            .as_bytes()
            .par_chunks(BLOCK_SIZE_BYTES)
            .map(|chunk| self.encrypt_block(key, &zero_padded_block(chunk)))
            .collect();
        BitBuffer::from(cypher_text.concat())
    }

    fn decrypt(
        &self,
        key: &[u8; KEY_SIZE_BYTES],
        message: &BitBuffer,
        original_length: Option<usize>,
    ) -> Result<BitBuffer> {
        let remainder = message.len() % (BLOCK_SIZE_BYTES * 8);
        if remainder != 0 {
            return Err(CipherError::TrailingCiphertextBits {
                length: message.len(),
                block: BLOCK_SIZE_BYTES * 8,
                remainder,
            });
        }
        let plain_text: Vec<[u8; BLOCK_SIZE_BYTES]> = message
            .as_bytes()
            .par_chunks_exact(BLOCK_SIZE_BYTES)
            .map(|chunk| exact_block(chunk).map(|block| self.decrypt_block(key, &block)))
            .collect::<Result<_>>()?;
        let mut plain_text = BitBuffer::from(plain_text.concat());
        match original_length {
            Some(original) if original > plain_text.len() => {
                return Err(CipherError::OriginalLengthTooLong {
                    original,
                    available: plain_text.len(),
                })
            }
            Some(original) => {
                log::debug!(
                    "stripping {} padding bits",
                    plain_text.len() - original
                );
                plain_text.truncate(original);
            }
            None => log::debug!("no original length given, padding bits are kept"),
        }
        Ok(plain_text)
    }

    fn encrypt_bits_block(&self, key: &[u8; KEY_SIZE_BYTES], block: &BitBuffer) -> Result<BitBuffer> {
        let block = block_from_bits::<BLOCK_SIZE_BYTES>(block)?;
        Ok(BitBuffer::from_bytes(&self.encrypt_block(key, &block)))
    }

    fn decrypt_bits_block(&self, key: &[u8; KEY_SIZE_BYTES], block: &BitBuffer) -> Result<BitBuffer> {
        let block = block_from_bits::<BLOCK_SIZE_BYTES>(block)?;
        Ok(BitBuffer::from_bytes(&self.decrypt_block(key, &block)))
    }

    /// Returns the bit length of the input, which `decrypt_file` needs to drop
    /// the padding again.
    fn encrypt_file(
        &self,
        key: &[u8; KEY_SIZE_BYTES],
        input: &Path,
        output: &Path,
    ) -> Result<usize> {
        let message = BitBuffer::from(fs::read(input)?);
        log::debug!("read {} bytes from {}", message.len() / 8, input.display());
        let cypher_text = self.encrypt(key, &message);
        fs::write(output, cypher_text.into_bytes())?;
        Ok(message.len())
    }

    fn decrypt_file(
        &self,
        key: &[u8; KEY_SIZE_BYTES],
        input: &Path,
        output: &Path,
        original_length: Option<usize>,
    ) -> Result<()> {
        let message = BitBuffer::from(fs::read(input)?);
        let plain_text = self.decrypt(key, &message, original_length)?;
        log::debug!("writing {} bits to {}", plain_text.len(), output.display());
        fs::write(output, plain_text.into_bytes())?;
        Ok(())
    }
}

impl<T, const BLOCK_SIZE_BYTES: usize, const KEY_SIZE_BYTES: usize>
    BlockCipherEngine<BLOCK_SIZE_BYTES, KEY_SIZE_BYTES> for T
where
    T: BlockCypher<BLOCK_SIZE_BYTES, KEY_SIZE_BYTES> + Sync,
{
}

fn block_from_bits<const BLOCK_SIZE_BYTES: usize>(block: &BitBuffer) -> Result<[u8; BLOCK_SIZE_BYTES]> {
    block
        .to_byte_array()
        .ok_or(CipherError::InvalidBlockLength {
            expected: BLOCK_SIZE_BYTES * 8,
            actual: block.len(),
        })
}

/// A cypher bound to an active key. Swapping the key needs `&mut self`, so a
/// shared `KeyedCypher` can never change key under a concurrent reader.
pub struct KeyedCypher<C, const BLOCK_SIZE_BYTES: usize, const KEY_SIZE_BYTES: usize> {
    cypher: C,
    key: Zeroizing<[u8; KEY_SIZE_BYTES]>,
}

impl<C, const BLOCK_SIZE_BYTES: usize, const KEY_SIZE_BYTES: usize>
    KeyedCypher<C, BLOCK_SIZE_BYTES, KEY_SIZE_BYTES>
where
    C: BlockCypher<BLOCK_SIZE_BYTES, KEY_SIZE_BYTES> + Sync,
{
    pub fn new(cypher: C, key: [u8; KEY_SIZE_BYTES]) -> Self {
        Self {
            cypher,
            key: Zeroizing::new(key),
        }
    }

    pub fn with_bit_key(cypher: C, key: &BitBuffer) -> Result<Self> {
        Ok(Self::new(cypher, key_from_bits(key)?))
    }

    pub fn change_key(&mut self, key: [u8; KEY_SIZE_BYTES]) {
        log::trace!("changing active key");
        self.key = Zeroizing::new(key);
    }

    pub fn change_bit_key(&mut self, key: &BitBuffer) -> Result<()> {
        self.change_key(key_from_bits(key)?);
        Ok(())
    }

    pub fn cypher(&self) -> &C {
        &self.cypher
    }

    pub fn encrypt_block(&self, block: &[u8; BLOCK_SIZE_BYTES]) -> [u8; BLOCK_SIZE_BYTES] {
        self.cypher.encrypt_block(&*self.key, block)
    }

    pub fn decrypt_block(&self, block: &[u8; BLOCK_SIZE_BYTES]) -> [u8; BLOCK_SIZE_BYTES] {
        self.cypher.decrypt_block(&*self.key, block)
    }

    pub fn encrypt(&self, message: &BitBuffer) -> BitBuffer {
        self.cypher.encrypt(&*self.key, message)
    }

    pub fn decrypt(&self, message: &BitBuffer, original_length: Option<usize>) -> Result<BitBuffer> {
        self.cypher.decrypt(&*self.key, message, original_length)
    }

    pub fn encrypt_file(&self, input: &Path, output: &Path) -> Result<usize> {
        self.cypher.encrypt_file(&*self.key, input, output)
    }

    pub fn decrypt_file(
        &self,
        input: &Path,
        output: &Path,
        original_length: Option<usize>,
    ) -> Result<()> {
        self.cypher
            .decrypt_file(&*self.key, input, output, original_length)
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
