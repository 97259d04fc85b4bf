//! 簡潔データ構造の基本部品

pub mod bit_stream;
pub mod bit_vector;

pub use bit_stream::BitStream;
pub use bit_vector::SuccinctBitVectorIndex;
