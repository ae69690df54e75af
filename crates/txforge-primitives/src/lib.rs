/// txforge primitives - hashing and wire-format building blocks.
///
/// Provides the hash functions, the cursor reader/writer pair, the
/// protocol VarInt, and the byte-reversed transaction hash type used
/// throughout the transaction kit.

pub mod hash;
pub mod txhash;
pub mod wire;

mod error;
pub use error::PrimitivesError;
pub use txhash::TxHash;
pub use wire::{ByteReader, ByteWriter, VarInt};
