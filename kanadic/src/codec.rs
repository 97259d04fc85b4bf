//! 辞書のバイナリ表現
//!
//! - [`key`]: キー文字列とトライの辺ラベル列の相互変換
//! - [`value`]: 値文字列の可変長符号
//! - [`token`]: トークンレコードのビット詰め

pub mod key;
pub mod token;
pub mod value;

pub use key::{decode_key, encode_key};
pub use token::{
    decode_token_list, encode_token_list, CostEncoding, OnDiskToken, PosEncoding, ValueEncoding,
};
pub use value::{decode_value, encode_value};
