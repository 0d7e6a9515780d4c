use std::fmt;
use std::ops::{BitXor, Range};

use crate::error::{CipherError, Result};

/// Ordered sequence of bits, stored MSB-first within each byte.
///
/// Bits past `len` in the last byte are kept at zero, so `as_bytes` is always
/// the zero-extended byte form of the buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            bytes: vec![0x00; len.div_ceil(8)],
            len,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            len: bytes.len() * 8,
        }
    }

    /// The low `width` bits of `value`, most significant first.
    ///
    /// ## Panics
    /// if width > 64
    pub fn from_uint(value: u64, width: usize) -> Self {
        assert!(width <= 64);
        (0..width)
            .map(|i| (value >> (width - 1 - i)) & 1 == 1)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| self.bit(index))
    }

    /// ## Panics
    /// if index >= len
    pub fn set(&mut self, index: usize, bit: bool) {
        assert!(
            index < self.len,
            "bit index {index} out of range for length {}",
            self.len
        );
        let mask = 0x80 >> (index % 8);
        if bit {
            self.bytes[index / 8] |= mask;
        } else {
            self.bytes[index / 8] &= !mask;
        }
    }

    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0x00);
        }
        self.len += 1;
        self.set(self.len - 1, bit);
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|index| self.bit(index))
    }

    /// ## Panics
    /// if the range is out of bounds
    pub fn slice(&self, range: Range<usize>) -> Self {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "slice {range:?} out of range for length {}",
            self.len
        );
        if range.start % 8 != 0 {
            return range.map(|index| self.bit(index)).collect();
        }
        let mut sliced = Self {
            bytes: self.bytes[range.start / 8..range.end.div_ceil(8)].to_vec(),
            len: range.end - range.start,
        };
        sliced.clear_tail();
        sliced
    }

    pub fn extend_from(&mut self, other: &BitBuffer) {
        if self.len % 8 == 0 {
            self.bytes.extend_from_slice(&other.bytes);
            self.len += other.len;
        } else {
            other.iter().for_each(|bit| self.push(bit));
        }
    }

    pub fn concat(&self, other: &BitBuffer) -> Self {
        let mut joined = self.clone();
        joined.extend_from(other);
        joined
    }

    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.bytes.truncate(len.div_ceil(8));
        self.len = len;
        self.clear_tail();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn to_uint(&self) -> Option<u64> {
        (self.len <= 64).then(|| self.iter().fold(0, |acc, bit| (acc << 1) | bit as u64))
    }

    /// The buffer as a fixed size array, if it is exactly `N` bytes long.
    pub fn to_byte_array<const N: usize>(&self) -> Option<[u8; N]> {
        if self.len != N * 8 {
            return None;
        }
        let mut array = [0x00; N];
        array.copy_from_slice(&self.bytes);
        Some(array)
    }

    /// Cyclic shift towards the front: `bits[amount..] ++ bits[..amount]`.
    pub fn left_cycle_shift(&self, amount: usize) -> Self {
        if self.is_empty() {
            return Self::new();
        }
        let amount = amount % self.len;
        self.slice(amount..self.len)
            .concat(&self.slice(0..amount))
    }

    fn bit(&self, index: usize) -> bool {
        self.bytes[index / 8] & (0x80 >> (index % 8)) != 0
    }

    fn clear_tail(&mut self) {
        let used = self.len % 8;
        if used != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= 0xFF << (8 - used);
            }
        }
    }
}

impl From<Vec<u8>> for BitBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        let len = bytes.len() * 8;
        Self { bytes, len }
    }
}

impl FromIterator<bool> for BitBuffer {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut buffer = Self::new();
        iter.into_iter().for_each(|bit| buffer.push(bit));
        buffer
    }
}

/// ## Panics
/// if the lengths differ
impl BitXor for &BitBuffer {
    type Output = BitBuffer;

    fn bitxor(self, rhs: Self) -> BitBuffer {
        assert_eq!(self.len, rhs.len, "xor of bit buffers with different lengths");
        BitBuffer {
            bytes: self
                .bytes
                .iter()
                .zip(rhs.bytes.iter())
                .map(|(a, b)| a ^ b)
                .collect(),
            len: self.len,
        }
    }
}

impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.iter()
            .try_for_each(|bit| f.write_str(if bit { "1" } else { "0" }))
    }
}

/// Builds a value with one bit per table entry, taken from the `width` bit
/// `input` at that entry's position. Position 0 is the most significant bit.
pub fn select_bits(input: u64, width: u32, table: &[u8]) -> u64 {
    table.iter().fold(0, |acc, &from| {
        (acc << 1) | ((input >> (width - 1 - from as u32)) & 1)
    })
}

pub fn inverse_permutation<const N: usize>(permutation: &[u8; N]) -> [u8; N] {
    let mut inverse = [0u8; N];
    for (index, &element) in permutation.iter().enumerate() {
        inverse[element as usize] = index as u8;
    }
    inverse
}

/// Rotates the low `width` bits of `value`.
///
/// ## Panics
/// unless 0 < width < 64
pub(crate) fn rotate_left_width(value: u64, amount: u32, width: u32) -> u64 {
    assert!(0 < width && width < 64, "rotation width {width} outside 1..64");
    let mask = (1u64 << width) - 1;
    let value = value & mask;
    let amount = amount % width;
    ((value << amount) | (value >> (width - amount))) & mask
}

pub(crate) fn check_selection<const N: usize>(
    name: &'static str,
    table: &[u8],
    bound: usize,
) -> Result<[u8; N]> {
    if table.len() != N {
        return Err(CipherError::InvalidTableLength {
            name,
            expected: N,
            actual: table.len(),
        });
    }
    if let Some((position, &value)) = table
        .iter()
        .enumerate()
        .find(|(_, &value)| value as usize >= bound)
    {
        return Err(CipherError::TableEntryOutOfRange {
            name,
            position,
            value,
            bound,
        });
    }
    let mut selection = [0u8; N];
    selection.copy_from_slice(table);
    Ok(selection)
}

pub(crate) fn check_permutation<const N: usize>(
    name: &'static str,
    table: &[u8],
) -> Result<[u8; N]> {
    let permutation = check_selection::<N>(name, table, N)?;
    let mut seen = [false; N];
    for &value in permutation.iter() {
        if std::mem::replace(&mut seen[value as usize], true) {
            return Err(CipherError::NotAPermutation { name, value });
        }
    }
    Ok(permutation)
}

/*
-
-
-                   TESTING
-
-
-
- */
