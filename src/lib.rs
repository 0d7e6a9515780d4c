#![allow(non_snake_case)]

pub mod error;
pub mod Bits;
pub mod Block_cypher;
mod Feistel_network;

pub mod Confidentiality {
    pub mod Composed;
    pub mod DES;
    pub mod GOST;
    pub mod STB;
}

pub use error::{CipherError, Result};
pub use Bits::BitBuffer;
pub use Block_cypher::{key_from_bits, key_from_hex, BlockCipherEngine, BlockCypher, KeyedCypher};
