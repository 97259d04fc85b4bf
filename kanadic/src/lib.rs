//! # kanadic
//!
//! kanadicは、かな漢字変換のためのコンパクトなシステム辞書の実装です。
//!
//! ## 概要
//!
//! 読み(キー)から、表記(値)・品詞ID・コストを持つトークンの一覧を引くための
//! 読み取り専用の辞書を構築し、検索します。キーと値はLOUDSトライに格納され、
//! トークン列はビット詰めしたレコードとしてrank/select索引付きの可変長配列に並びます。
//!
//! ## 主な機能
//!
//! - **簡潔データ構造**: rank/select索引付きビットベクトルとLOUDSトライ
//! - **コンパクトなトークン表現**: 頻出品詞テーブル、直前参照、1バイトコストによる圧縮
//! - **接頭辞検索**: 入力の先頭に一致するすべての読みを1回の走査で列挙
//! - **ゼロコピー読み込み**: メモリマップしたコンテナをそのまま検索
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kanadic::{SystemDictionary, SystemDictionaryBuilder};
//!
//! let source = "ねこ\t10\t20\t500\tねこ
//! ねこ\t10\t20\t700\tネコ
//! ねこ\t10\t20\t400\t猫
//! ね\t30\t30\t800\t根";
//!
//! let mut builder = SystemDictionaryBuilder::new();
//! builder.add_reader(source.as_bytes(), "source.tsv")?;
//! let bytes = builder.build()?.to_bytes()?;
//!
//! let dict = SystemDictionary::open(&bytes)?;
//! let entries = dict.lookup_exact_and_prefixes("ねこです")?;
//! assert_eq!(entries.len(), 2);
//!
//! assert_eq!(entries[0].key, "ね");
//! assert_eq!(entries[0].tokens[0].value, "根");
//!
//! assert_eq!(entries[1].key, "ねこ");
//! let values: Vec<_> = entries[1].tokens.iter().map(|t| t.value.as_str()).collect();
//! assert_eq!(values.len(), 3);
//! assert!(values.contains(&"猫"));
//! assert!(values.contains(&"ネコ"));
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// キー・値・トークンのバイナリ表現
pub mod codec;

/// 辞書データ構造とビルダー
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// 文字種変換
pub mod kana;

/// 数値型のユーティリティ
pub mod num;

/// 簡潔ビットベクトル
pub mod succinct;

/// トークン型の定義
pub mod token;

/// 内部ユーティリティ関数
pub mod utils;

#[cfg(test)]
mod tests;

// Re-exports
pub use dictionary::{
    BuildStats, BuiltDictionary, DictionaryFile, LookupEntry, SystemDictionary,
    SystemDictionaryBuilder,
};
pub use kana::{KanaConverter, ScriptConverter};
pub use token::{Token, TokenAttribute};

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
