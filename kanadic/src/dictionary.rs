//! かな漢字変換のためのシステム辞書
//!
//! 辞書はキートライ、値トライ、トークン配列、頻出品詞テーブルの4セクションから成る
//! コンテナです。[`SystemDictionary`]はコンテナのバイト列を借用し、
//! 索引を一度だけ作ってから読み取り専用で検索します。
//!
//! # 辞書の読み込み方法
//!
//! - [`DictionaryFile::from_path`]: ファイルをメモリマップする(推奨)
//! - [`DictionaryFile::read`]: リーダーから読み込む
//! - [`DictionaryFile::from_zstd`]: Zstandard圧縮されたファイルを展開する
//!
//! # 辞書のビルド
//!
//! [`SystemDictionaryBuilder`]を使用して、トークン列またはタブ区切りのソースから
//! 辞書を構築できます。
pub mod builder;
pub mod config;
pub mod container;
pub mod frequent_pos;
pub mod louds;
pub mod source;
pub mod token_array;

use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use crate::codec::{decode_key, decode_token_list, decode_value, encode_key};
use crate::codec::{PosEncoding, ValueEncoding};
use crate::dictionary::config::LoudsCacheConfig;
use crate::dictionary::container::Sections;
use crate::dictionary::frequent_pos::FrequentPosTable;
use crate::dictionary::louds::trie::LoudsTrie;
use crate::dictionary::token_array::BitVectorBasedArray;
use crate::errors::{KanadicError, Result};
use crate::kana::{KanaConverter, ScriptConverter};
use crate::token::{Token, TokenAttribute};
use crate::utils::FromU32;

pub use crate::dictionary::builder::{BuildStats, BuiltDictionary, SystemDictionaryBuilder};

/// 検索結果の1件
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LookupEntry {
    /// キートライ中のID
    pub key_id: u32,
    /// 一致した読み
    pub key: String,
    /// 格納順のトークン
    pub tokens: Vec<Token>,
}

/// コンテナを借用して検索するシステム辞書
pub struct SystemDictionary<'a> {
    key_trie: LoudsTrie<'a>,
    value_trie: LoudsTrie<'a>,
    token_array: BitVectorBasedArray<'a>,
    frequent_pos: FrequentPosTable,
    converter: Arc<dyn ScriptConverter>,
}

impl<'a> SystemDictionary<'a> {
    /// コンテナを開き、索引を構築します。
    ///
    /// # エラー
    ///
    /// コンテナやいずれかのセクションが壊れている場合、
    /// [`KanadicError::MalformedContainer`]を返します。
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        Self::open_with_converter(bytes, Arc::new(KanaConverter))
    }

    /// 文字種変換器を指定してコンテナを開きます。
    ///
    /// 変換器は辞書の構築に使ったものと同じでなければなりません。
    pub fn open_with_converter(
        bytes: &'a [u8],
        converter: Arc<dyn ScriptConverter>,
    ) -> Result<Self> {
        let sections = Sections::read(bytes)?;
        let key_trie = LoudsTrie::new(sections.key, &LoudsCacheConfig::KEY_TRIE)?;
        let value_trie = LoudsTrie::new(sections.value, &LoudsCacheConfig::VALUE_TRIE)?;
        let token_array = BitVectorBasedArray::new(sections.token)?;
        let frequent_pos = FrequentPosTable::new(sections.frequent_pos)?;

        // one record per key plus the terminator
        if token_array.len() != key_trie.num_keys() + 1 {
            return Err(KanadicError::malformed(
                "token array",
                format!(
                    "{} records for {} keys",
                    token_array.len(),
                    key_trie.num_keys()
                ),
            ));
        }

        Ok(Self {
            key_trie,
            value_trie,
            token_array,
            frequent_pos,
            converter,
        })
    }

    /// 登録されている読みの数
    #[inline(always)]
    pub fn num_keys(&self) -> usize {
        self.key_trie.num_keys()
    }

    /// 入力の先頭に一致するすべての読みを、短い順に返します。
    ///
    /// 入力そのものが読みとして登録されていれば、最後の要素になります。
    ///
    /// # エラー
    ///
    /// トークンの復号に失敗した場合にエラーを返します。
    pub fn lookup_exact_and_prefixes(&self, key: &str) -> Result<Vec<LookupEntry>> {
        let encoded = encode_key(key);
        self.key_trie
            .find_prefixes(&encoded)
            .into_iter()
            .map(|(key_id, len)| {
                let key = decode_key(&encoded[..len])?;
                let tokens = self.resolve_tokens(key_id, &key)?;
                Ok(LookupEntry {
                    key_id,
                    key,
                    tokens,
                })
            })
            .collect()
    }

    /// 入力と完全に一致する読みを返します。
    pub fn lookup_exact(&self, key: &str) -> Result<Option<LookupEntry>> {
        let Some(key_id) = self.key_trie.lookup(&encode_key(key)) else {
            return Ok(None);
        };
        let key = key.replace('\0', "");
        let tokens = self.resolve_tokens(key_id, &key)?;
        Ok(Some(LookupEntry {
            key_id,
            key,
            tokens,
        }))
    }

    /// IDから読みを復元します。
    ///
    /// # エラー
    ///
    /// IDが範囲外の場合、[`KanadicError::InvalidArgument`]を返します。
    pub fn key(&self, key_id: u32) -> Result<String> {
        let bytes = self.key_trie.restore_key_bytes(key_id).ok_or_else(|| {
            KanadicError::invalid_argument("key_id", format!("{key_id} is out of range"))
        })?;
        decode_key(&bytes)
    }

    /// IDに対応するトークンを格納順に返します。
    pub fn tokens(&self, key_id: u32) -> Result<Vec<Token>> {
        let key = self.key(key_id)?;
        self.resolve_tokens(key_id, &key)
    }

    fn resolve_tokens(&self, key_id: u32, key: &str) -> Result<Vec<Token>> {
        let record = self
            .token_array
            .get(usize::from_u32(key_id))
            .ok_or_else(|| {
                KanadicError::malformed("token array", format!("no record for key {key_id}"))
            })?;

        let mut tokens: Vec<Token> = vec![];
        for t in decode_token_list(record)? {
            let prev = tokens.last();
            let (left_id, right_id) = match t.pos {
                PosEncoding::Frequent(id) => {
                    let pos = self.frequent_pos.get(id);
                    (pos.left_id(), pos.right_id())
                }
                PosEncoding::Full { left_id, right_id } => (left_id, right_id),
                PosEncoding::Mono(id) => (id, id),
                PosEncoding::SameAsPrev => prev
                    .map(|p| (p.left_id, p.right_id))
                    .ok_or_else(|| KanadicError::invalid_flags(0, "no previous pos"))?,
            };
            let value = match t.value {
                ValueEncoding::Normal(id) => {
                    let bytes = self.value_trie.restore_key_bytes(id).ok_or_else(|| {
                        KanadicError::malformed("value trie", format!("no value for id {id}"))
                    })?;
                    decode_value(&bytes)?
                }
                ValueEncoding::AsIsHiragana => key.to_string(),
                ValueEncoding::AsIsKatakana => self.converter.hiragana_to_katakana(key),
                ValueEncoding::SameAsPrev => prev
                    .map(|p| p.value.clone())
                    .ok_or_else(|| KanadicError::invalid_flags(0, "no previous value"))?,
            };
            let attribute = if t.spelling_correction {
                TokenAttribute::SPELLING_CORRECTION
            } else {
                TokenAttribute::NONE
            };
            tokens.push(
                Token::new(key, value, t.cost.cost(), left_id, right_id)
                    .with_attribute(attribute),
            );
        }
        Ok(tokens)
    }
}

enum DictBuffer {
    Mmap(Mmap),
    Heap(Vec<u8>),
}

impl Deref for DictBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Mmap(m) => &m[..],
            Self::Heap(v) => &v[..],
        }
    }
}

/// コンテナのバイト列を所有する辞書ファイル
///
/// 検索は[`DictionaryFile::open`]で得た[`SystemDictionary`]を通して行います。
pub struct DictionaryFile {
    buffer: DictBuffer,
}

impl DictionaryFile {
    /// ファイルをメモリマップして読み込みます。
    ///
    /// # 引数
    ///
    /// * `path` - コンテナファイルへのパス
    ///
    /// # エラー
    ///
    /// ファイルを開けない場合、またはコンテナのフレーミングが壊れている場合に
    /// エラーを返します。
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path.as_ref()).map_err(|e| {
            KanadicError::invalid_argument("path", format!("Failed to open dictionary file: {e}"))
        })?;
        // The mapping is read-only and the file is not expected to change while loaded.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::new(DictBuffer::Mmap(mmap))
    }

    /// リーダーからすべてのバイトを読み込みます。
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut bytes = vec![];
        rdr.read_to_end(&mut bytes)?;
        Self::new(DictBuffer::Heap(bytes))
    }

    /// Zstandard圧縮されたコンテナを展開して読み込みます。
    pub fn from_zstd_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        Self::read(zstd::Decoder::new(rdr)?)
    }

    /// Zstandard圧縮されたファイルを展開して読み込みます。
    pub fn from_zstd<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path.as_ref()).map_err(|e| {
            KanadicError::invalid_argument("path", format!("Failed to open dictionary file: {e}"))
        })?;
        Self::from_zstd_reader(file)
    }

    fn new(buffer: DictBuffer) -> Result<Self> {
        Sections::read(&buffer)?;
        Ok(Self { buffer })
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// 索引を構築して検索可能な辞書を返します。
    pub fn open(&self) -> Result<SystemDictionary<'_>> {
        SystemDictionary::open(&self.buffer)
    }
}
