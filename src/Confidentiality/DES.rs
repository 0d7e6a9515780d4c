use std::sync::Arc;

use rand::prelude::*;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

use crate::Bits::{check_permutation, check_selection, inverse_permutation, rotate_left_width, select_bits};
use crate::Block_cypher::BlockCypher;
use crate::Feistel_network::{classic_feistel_network_decrypt, classic_feistel_network_encrypt};
use crate::error::{CipherError, Result};

pub const DES_BLOCK_SIZE_BYTES: usize = 8;
/// 56 key bits, no parity bits.
pub const DES_KEY_SIZE_BYTES: usize = 7;

const ROUNDS: usize = 16;
const HALF_KEY_BITS: u32 = 28;
const HALF_KEY_MASK: u64 = (1 << HALF_KEY_BITS) - 1;

type SBox = [[u8; 16]; 4];

/// Raw, unchecked table set. This is what gets written to and read from disk;
/// turn it into [`DESParameters`] to use it.
///
/// All positions count from the most significant bit, starting at 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DESTables {
    /// 64 entries, a permutation of `0..64`.
    pub initial_permutation: Vec<u8>,
    /// 48 entries below 32, repeats allowed.
    pub expansion: Vec<u8>,
    /// Eight boxes of 4 rows by 16 nibbles.
    pub s_boxes: Vec<SBox>,
    /// 32 entries, a permutation of `0..32`.
    pub output_permutation: Vec<u8>,
    /// 56 entries, a permutation of `0..56`.
    pub key_permutation: Vec<u8>,
    /// 48 entries below 56.
    pub key_compression: Vec<u8>,
}

/// A validated table set. Different parameters make a different cypher, they
/// are not part of the key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DESParameters {
    initial_permutation: [u8; 64],
    inverse_initial_permutation: [u8; 64],
    expansion: [u8; 48],
    s_boxes: [SBox; 8],
    output_permutation: [u8; 32],
    key_permutation: [u8; 56],
    key_compression: [u8; 48],
}

fn shuffled<R: Rng + ?Sized>(rng: &mut R, n: u8) -> Vec<u8> {
    let mut table: Vec<u8> = (0..n).collect();
    table.shuffle(rng);
    table
}

impl DESParameters {
    pub fn new(tables: DESTables) -> Result<Self> {
        if tables.s_boxes.len() != 8 {
            return Err(CipherError::InvalidTableLength {
                name: "s_boxes",
                expected: 8,
                actual: tables.s_boxes.len(),
            });
        }
        let mut s_boxes = [[[0u8; 16]; 4]; 8];
        for (s_box, supplied) in s_boxes.iter_mut().zip(tables.s_boxes.iter()) {
            for (row, supplied_row) in s_box.iter_mut().zip(supplied.iter()) {
                *row = check_selection("s_boxes", supplied_row, 16)?;
            }
        }
        let initial_permutation = check_permutation("initial_permutation", &tables.initial_permutation)?;
        Ok(Self {
            inverse_initial_permutation: inverse_permutation(&initial_permutation),
            initial_permutation,
            expansion: check_selection("expansion", &tables.expansion, 32)?,
            s_boxes,
            output_permutation: check_permutation("output_permutation", &tables.output_permutation)?,
            key_permutation: check_permutation("key_permutation", &tables.key_permutation)?,
            key_compression: check_selection("key_compression", &tables.key_compression, 56)?,
        })
    }

    pub fn generate() -> Self {
        Self::generate_with(&mut thread_rng())
    }

    /// Draws every table independently. S-box rows are permutations of the
    /// nibbles, the key compression picks 48 distinct positions out of 56.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let expansion = (0..48).map(|_| rng.gen_range(0..32)).collect();
        let s_boxes = (0..8)
            .map(|_| {
                let mut s_box = [[0u8; 16]; 4];
                for row in s_box.iter_mut() {
                    row.copy_from_slice(&shuffled(rng, 16));
                }
                s_box
            })
            .collect();
        let tables = DESTables {
            initial_permutation: shuffled(rng, 64),
            expansion,
            s_boxes,
            output_permutation: shuffled(rng, 32),
            key_permutation: shuffled(rng, 56),
            key_compression: sample(rng, 56, 48).into_iter().map(|i| i as u8).collect(),
        };
        log::debug!("generated DES parameters");
        // Every generated table has the required shape.
        match Self::new(tables) {
            Ok(parameters) => parameters,
            Err(err) => unreachable!("generated DES tables rejected: {err}"),
        }
    }

    pub fn tables(&self) -> DESTables {
        DESTables {
            initial_permutation: self.initial_permutation.to_vec(),
            expansion: self.expansion.to_vec(),
            s_boxes: self.s_boxes.to_vec(),
            output_permutation: self.output_permutation.to_vec(),
            key_permutation: self.key_permutation.to_vec(),
            key_compression: self.key_compression.to_vec(),
        }
    }

    /// The table set as pretty JSON, the form `from_json` reads back.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.tables())?)
    }

    /// Parses a stored table set and validates it like [`DESParameters::new`].
    pub fn from_json(json: &str) -> Result<Self> {
        let tables: DESTables = serde_json::from_str(json)?;
        log::debug!("loaded DES tables, validating");
        Self::new(tables)
    }

    pub fn inverse_initial_permutation(&self) -> &[u8; 64] {
        &self.inverse_initial_permutation
    }
}

/// Eight 6 bit groups through the S-boxes. The first two bits of a group pick
/// the row, the last four the column.
fn s_box_substitution(s_boxes: &[SBox; 8], block: u64) -> u64 {
    s_boxes
        .iter()
        .enumerate()
        .fold(0, |acc, (i, s_box)| {
            let group = (block >> (42 - 6 * i)) & 0x3f;
            let row = (group >> 4) as usize;
            let column = (group & 0x0f) as usize;
            (acc << 4) | s_box[row][column] as u64
        })
}

/// DES-shaped Feistel cypher over a generated table set.
#[derive(Clone, Debug)]
pub struct DES {
    parameters: Arc<DESParameters>,
}

impl DES {
    pub fn new(parameters: impl Into<Arc<DESParameters>>) -> Self {
        Self {
            parameters: parameters.into(),
        }
    }

    pub fn parameters(&self) -> &Arc<DESParameters> {
        &self.parameters
    }

    pub fn feistel_function(&self, half: u32, round_key: u64) -> u32 {
        let expanded = select_bits(half as u64, 32, &self.parameters.expansion) ^ round_key;
        let substituted = s_box_substitution(&self.parameters.s_boxes, expanded);
        select_bits(substituted, 32, &self.parameters.output_permutation) as u32
    }

    /// The sixteen 48 bit round keys, in encryption order.
    pub fn round_keys(&self, key: &[u8; DES_KEY_SIZE_BYTES]) -> [u64; ROUNDS] {
        let mut raw = [0u8; 8];
        raw[1..].copy_from_slice(key);
        let permuted = select_bits(u64::from_be_bytes(raw), 56, &self.parameters.key_permutation);
        let mut left = permuted >> HALF_KEY_BITS;
        let mut right = permuted & HALF_KEY_MASK;
        let mut round_keys = [0u64; ROUNDS];
        for (round, round_key) in round_keys.iter_mut().enumerate() {
            let shift = (round % 2 + 1) as u32;
            left = rotate_left_width(left, shift, HALF_KEY_BITS);
            right = rotate_left_width(right, shift, HALF_KEY_BITS);
            *round_key = select_bits(
                (left << HALF_KEY_BITS) | right,
                56,
                &self.parameters.key_compression,
            );
        }
        round_keys
    }

    fn split_permuted(&self, block: &[u8; DES_BLOCK_SIZE_BYTES]) -> (u32, u32) {
        let permuted = select_bits(
            u64::from_be_bytes(*block),
            64,
            &self.parameters.initial_permutation,
        );
        ((permuted >> 32) as u32, permuted as u32)
    }

    fn join_permuted(&self, left: u32, right: u32) -> [u8; DES_BLOCK_SIZE_BYTES] {
        select_bits(
            ((left as u64) << 32) | right as u64,
            64,
            &self.parameters.inverse_initial_permutation,
        )
        .to_be_bytes()
    }
}

impl BlockCypher<DES_BLOCK_SIZE_BYTES, DES_KEY_SIZE_BYTES> for DES {
    fn encrypt_block(&self, key: &[u8; DES_KEY_SIZE_BYTES], plain_text_block: &[u8; DES_BLOCK_SIZE_BYTES]) -> [u8; DES_BLOCK_SIZE_BYTES] {
        let (left, right) = self.split_permuted(plain_text_block);
        let (left, right) = classic_feistel_network_encrypt(
            left,
            right,
            &self.round_keys(key),
            |half, round_key| self.feistel_function(half, *round_key),
        );
        self.join_permuted(left, right)
    }

    fn decrypt_block(&self, key: &[u8; DES_KEY_SIZE_BYTES], cypher_text_block: &[u8; DES_BLOCK_SIZE_BYTES]) -> [u8; DES_BLOCK_SIZE_BYTES] {
        let (left, right) = self.split_permuted(cypher_text_block);
        let (left, right) = classic_feistel_network_decrypt(
            right,
            left,
            &self.round_keys(key),
            |half, round_key| self.feistel_function(half, *round_key),
        );
        self.join_permuted(left, right)
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
