//! システム辞書のビルダー
//!
//! トークン列から4つのセクション(値トライ、トークン配列、キートライ、頻出品詞テーブル)を
//! 作り、コンテナとして書き出します。処理は次の順で行われ、入れ替わることはありません。
//!
//! 1. トークンの検証
//! 2. 読みごとのグループ化と、値の表現(そのまま/カタカナ)の判定
//! 3. 頻出品詞テーブルの構築
//! 4. 値トライの構築
//! 5. キートライの構築
//! 6. トライIDと頻出品詞IDの解決
//! 7. 読みごとのトークンの並べ替え
//! 8. 直前と同じ品詞・値の検出
//! 9. 1バイトコストを使える読みの判定
//! 10. トークン配列の符号化
//! 11. コンテナの書き出し

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use hashbrown::{HashMap, HashSet};

use crate::codec::token::TOKEN_TERMINATION;
use crate::codec::{encode_key, encode_token_list, encode_value};
use crate::codec::{CostEncoding, OnDiskToken, PosEncoding, ValueEncoding};
use crate::dictionary::config::TokenArrayConfig;
use crate::dictionary::container::Sections;
use crate::dictionary::frequent_pos::FrequentPosMap;
use crate::dictionary::louds::builder::{BuiltLoudsTrie, LoudsTrieBuilder};
use crate::dictionary::source::read_tokens;
use crate::dictionary::token_array::BitVectorBasedArrayBuilder;
use crate::errors::{KanadicError, Result};
use crate::kana::{KanaConverter, ScriptConverter};
use crate::token::{CostType, KeyInfo, PosType, Token, TokenAttribute, TokenInfo, ValueType};
use crate::utils::FromU32;

/// 1バイトコストを使える読みの最小バイト長(UTF-8)
const SMALL_COST_MIN_KEY_LEN: usize = 6;

/// 1バイトコストの対象になる最小のコスト
const SMALL_COST_MIN_COST: u16 = 0x100;

/// トークンを集めてシステム辞書を構築するビルダー
///
/// # 例
///
/// ```
/// use kanadic::{SystemDictionary, SystemDictionaryBuilder, Token};
///
/// let mut builder = SystemDictionaryBuilder::new();
/// builder.add_tokens([
///     Token::new("ねこ", "猫", 500, 10, 20),
///     Token::new("ねこ", "ネコ", 700, 10, 20),
/// ]);
/// let bytes = builder.build()?.to_bytes()?;
///
/// let dict = SystemDictionary::open(&bytes)?;
/// let entry = dict.lookup_exact("ねこ")?.unwrap();
/// assert_eq!(2, entry.tokens.len());
/// # Ok::<(), kanadic::errors::KanadicError>(())
/// ```
pub struct SystemDictionaryBuilder {
    tokens: Vec<Token>,
    converter: Arc<dyn ScriptConverter>,
    array_config: TokenArrayConfig,
}

impl Default for SystemDictionaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemDictionaryBuilder {
    /// [`KanaConverter`]とデフォルトの配列設定でビルダーを作ります。
    pub fn new() -> Self {
        Self {
            tokens: vec![],
            converter: Arc::new(KanaConverter),
            array_config: TokenArrayConfig::default(),
        }
    }

    /// 文字種変換器を差し替えます。
    pub fn with_converter<C>(mut self, converter: C) -> Self
    where
        C: ScriptConverter + 'static,
    {
        self.converter = Arc::new(converter);
        self
    }

    /// トークン配列のチャンク長を設定します。
    pub fn with_array_config(mut self, config: TokenArrayConfig) -> Self {
        self.array_config = config;
        self
    }

    #[inline(always)]
    pub fn num_tokens(&self) -> usize {
        self.tokens.len()
    }

    /// 解析済みのトークンを追加します。
    pub fn add_tokens<I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = Token>,
    {
        self.tokens.extend(tokens);
    }

    /// タブ区切りのソースを1つ読み込みます。
    ///
    /// # 引数
    ///
    /// * `rdr` - ソースのリーダー
    /// * `source` - エラーメッセージに使う名前
    ///
    /// # エラー
    ///
    /// 不正な行があると[`KanadicError::InvalidInputRow`]を返し、そのソースのトークンは
    /// 1つも追加されません。
    pub fn add_reader<R>(&mut self, rdr: R, source: &str) -> Result<()>
    where
        R: BufRead,
    {
        let tokens = read_tokens(rdr, source, &*self.converter)?;
        self.tokens.extend(tokens);
        Ok(())
    }

    /// 複数のソースファイルを並列に読み込みます。
    ///
    /// トークンは`paths`の順に連結されます。
    ///
    /// # エラー
    ///
    /// いずれかのファイルの読み込みに失敗した場合はそのエラーを返し、
    /// トークンは1つも追加されません。読み込みスレッドがパニックした場合は
    /// [`KanadicError::ThreadPanic`]を返します。
    pub fn add_sources<P>(&mut self, paths: &[P]) -> Result<()>
    where
        P: AsRef<Path> + Sync,
    {
        let converter = &*self.converter;
        let results: Vec<Result<Vec<Token>>> = thread::scope(|s| {
            let handles: Vec<_> = paths
                .iter()
                .map(|path| {
                    s.spawn(move || -> Result<Vec<Token>> {
                        let path = path.as_ref();
                        let rdr = BufReader::new(File::open(path)?);
                        read_tokens(rdr, &path.display().to_string(), converter)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|e| Err(KanadicError::ThreadPanic(panic_message(e))))
                })
                .collect()
        });

        let mut tokens = vec![];
        for result in results {
            tokens.extend(result?);
        }
        self.tokens.extend(tokens);
        Ok(())
    }

    /// 辞書を構築します。
    ///
    /// # 戻り値
    ///
    /// すべての段階が成功した場合にのみ、書き出し可能な[`BuiltDictionary`]を返します。
    ///
    /// # エラー
    ///
    /// - トークンが1つもない場合は[`KanadicError::InvalidArgument`]
    /// - IDやコストがビット幅を超える場合は[`KanadicError::ValueOutOfRange`]
    /// - 読みや値が空の場合、または読みがU+0000を含む場合は[`KanadicError::InvalidInputRow`]
    /// - 内部の整合性検査に失敗した場合は[`KanadicError::InvalidState`]または
    ///   [`KanadicError::InconsistentFrequentPosResult`]
    pub fn build(&self) -> Result<BuiltDictionary> {
        if self.tokens.is_empty() {
            return Err(KanadicError::invalid_argument("tokens", "no tokens to build"));
        }
        validate_tokens(&self.tokens)?;
        log::debug!("validated {} tokens", self.tokens.len());

        let mut keys = group_by_key(&self.tokens, &*self.converter);
        log::debug!("grouped into {} keys", keys.len());

        let frequent_pos = FrequentPosMap::build(
            keys.iter()
                .flat_map(|k| k.tokens.iter().map(TokenInfo::combined_pos)),
        )?;
        log::debug!(
            "frequent pos table: {} entries, threshold {:?}",
            frequent_pos.len(),
            frequent_pos.threshold(),
        );

        let value_trie = build_value_trie(&keys)?;
        log::debug!(
            "value trie: {} values, {} bytes",
            value_trie.num_keys(),
            value_trie.image().len(),
        );

        let key_trie = build_key_trie(&keys)?;
        log::debug!(
            "key trie: {} keys, {} bytes",
            key_trie.num_keys(),
            key_trie.image().len(),
        );

        resolve_ids(&mut keys, &key_trie, &value_trie, &frequent_pos)?;
        sort_tokens(&mut keys);
        mark_same_as_prev(&mut keys);
        let num_small_cost_keys = mark_small_cost(&mut keys);
        log::debug!("{num_small_cost_keys} keys use the 1-byte cost");

        let token_array = encode_token_array(&keys, key_trie.num_keys(), self.array_config)?;
        log::debug!("token array: {} bytes", token_array.len());

        let stats = BuildStats {
            num_tokens: self.tokens.len(),
            num_keys: key_trie.num_keys(),
            num_values: value_trie.num_keys(),
            num_frequent_pos: frequent_pos.len(),
            frequency_threshold: frequent_pos.threshold(),
            num_small_cost_keys,
            value_trie_bytes: value_trie.image().len(),
            key_trie_bytes: key_trie.image().len(),
            token_array_bytes: token_array.len(),
        };
        Ok(BuiltDictionary {
            value_trie: value_trie.into_image(),
            token_array,
            key_trie: key_trie.into_image(),
            frequent_pos: frequent_pos.to_bytes(),
            stats,
        })
    }
}

fn panic_message(e: Box<dyn Any + Send>) -> String {
    if let Some(s) = e.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = e.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn validate_tokens(tokens: &[Token]) -> Result<()> {
    for (i, token) in tokens.iter().enumerate() {
        token.validate()?;
        if token.key.is_empty() {
            return Err(KanadicError::invalid_row("tokens", i + 1, "empty key"));
        }
        // U+0000 never reaches the key trie, so it would merge distinct keys.
        if token.key.contains('\0') {
            return Err(KanadicError::invalid_row("tokens", i + 1, "key contains U+0000"));
        }
        if token.value.is_empty() {
            return Err(KanadicError::invalid_row("tokens", i + 1, "empty value"));
        }
    }
    Ok(())
}

/// 読みのバイト順にグループ化し、値の表現を判定します。
fn group_by_key(tokens: &[Token], converter: &dyn ScriptConverter) -> Vec<KeyInfo> {
    let mut groups: BTreeMap<&str, Vec<TokenInfo>> = BTreeMap::new();
    for token in tokens {
        groups
            .entry(token.key.as_str())
            .or_default()
            .push(TokenInfo::new(token.clone()));
    }

    groups
        .into_iter()
        .map(|(key, mut infos)| {
            let katakana = converter.hiragana_to_katakana(key);
            for info in &mut infos {
                info.value_type = if info.token.value == key {
                    ValueType::AsIsHiragana
                } else if info.token.value == katakana {
                    ValueType::AsIsKatakana
                } else {
                    ValueType::Default
                };
            }
            let mut key_info = KeyInfo::new(key.to_string());
            key_info.tokens = infos;
            key_info
        })
        .collect()
}

fn build_value_trie(keys: &[KeyInfo]) -> Result<BuiltLoudsTrie> {
    let mut builder = LoudsTrieBuilder::new();
    for info in keys.iter().flat_map(|k| &k.tokens) {
        if info.value_type == ValueType::Default {
            builder.push(encode_value(&info.token.value));
        }
    }
    builder.build()
}

fn build_key_trie(keys: &[KeyInfo]) -> Result<BuiltLoudsTrie> {
    let mut builder = LoudsTrieBuilder::new();
    for key in keys {
        builder.push(encode_key(&key.key));
    }
    builder.build()
}

fn resolve_ids(
    keys: &mut [KeyInfo],
    key_trie: &BuiltLoudsTrie,
    value_trie: &BuiltLoudsTrie,
    frequent_pos: &FrequentPosMap,
) -> Result<()> {
    for key in keys {
        let id = key_trie.get_id(&encode_key(&key.key)).ok_or_else(|| {
            KanadicError::invalid_state("key is missing from the key trie", key.key.clone())
        })?;
        key.id_in_key_trie = Some(id);

        for info in &mut key.tokens {
            // As-is values get an id too when the value trie holds the same string.
            let id = value_trie.get_id(&encode_value(&info.token.value));
            if id.is_none() && info.value_type == ValueType::Default {
                return Err(KanadicError::invalid_state(
                    "value is missing from the value trie",
                    info.token.value.clone(),
                ));
            }
            info.id_in_value_trie = id;
            info.id_in_frequent_pos_map = frequent_pos.get(info.combined_pos());
        }
    }
    Ok(())
}

fn sort_tokens(keys: &mut [KeyInfo]) {
    for key in keys {
        key.tokens.sort_by(|a, b| {
            b.token
                .left_id
                .cmp(&a.token.left_id)
                .then_with(|| b.token.right_id.cmp(&a.token.right_id))
                .then_with(|| a.id_in_value_trie.cmp(&b.id_in_value_trie))
                .then_with(|| a.token.attribute.bits().cmp(&b.token.attribute.bits()))
        });
    }
}

fn mark_same_as_prev(keys: &mut [KeyInfo]) {
    for key in keys {
        for i in 0..key.tokens.len() {
            let (before, rest) = key.tokens.split_at_mut(i);
            let info = &mut rest[0];
            let prev = before.last();

            info.pos_type = if info.id_in_frequent_pos_map.is_some() {
                PosType::FrequentPos
            } else {
                PosType::Default
            };
            if let Some(prev) = prev {
                if prev.combined_pos() == info.combined_pos() {
                    info.pos_type = PosType::SameAsPrev;
                }
                if !info.value_type.is_as_is() && prev.token.value == info.token.value {
                    info.value_type = ValueType::SameAsPrev;
                }
            }
        }
    }
}

/// 1バイトコストを使えるトークンに印を付け、対象になった読みの数を返します。
fn mark_small_cost(keys: &mut [KeyInfo]) -> usize {
    // values that appear under more than one key
    let heterophones: HashSet<String> = {
        let mut first_key: HashMap<&str, &str> = HashMap::new();
        let mut set = HashSet::new();
        for key in keys.iter() {
            for info in &key.tokens {
                let value = info.token.value.as_str();
                let first = *first_key.entry(value).or_insert(key.key.as_str());
                if first != key.key {
                    set.insert(value.to_string());
                }
            }
        }
        set
    };

    let mut num_keys = 0;
    for key in keys {
        if key.key.len() < SMALL_COST_MIN_KEY_LEN {
            continue;
        }
        let mut positions = HashSet::new();
        let homonym = !key.tokens.iter().all(|t| positions.insert(t.combined_pos()));
        if homonym {
            continue;
        }
        if key
            .tokens
            .iter()
            .any(|t| heterophones.contains(&t.token.value))
        {
            continue;
        }
        num_keys += 1;
        for info in &mut key.tokens {
            if info.token.cost >= SMALL_COST_MIN_COST {
                info.cost_type = CostType::CanUseSmallEncoding;
            }
        }
    }
    num_keys
}

fn to_on_disk(info: &TokenInfo) -> Result<OnDiskToken> {
    let token = &info.token;
    let pos = match info.pos_type {
        PosType::SameAsPrev => PosEncoding::SameAsPrev,
        PosType::FrequentPos => {
            let id = info.id_in_frequent_pos_map.ok_or_else(|| {
                KanadicError::invalid_state("frequent pos id is unresolved", token.key.clone())
            })?;
            PosEncoding::Frequent(id)
        }
        PosType::Default if token.left_id == token.right_id => PosEncoding::Mono(token.left_id),
        PosType::Default => PosEncoding::Full {
            left_id: token.left_id,
            right_id: token.right_id,
        },
    };
    let cost = match info.cost_type {
        CostType::Default => CostEncoding::Normal(token.cost),
        CostType::CanUseSmallEncoding => CostEncoding::Small(token.cost),
    };
    let value = match info.value_type {
        ValueType::SameAsPrev => ValueEncoding::SameAsPrev,
        ValueType::AsIsHiragana => ValueEncoding::AsIsHiragana,
        ValueType::AsIsKatakana => ValueEncoding::AsIsKatakana,
        ValueType::Default => {
            let id = info.id_in_value_trie.ok_or_else(|| {
                KanadicError::invalid_state("value trie id is unresolved", token.value.clone())
            })?;
            ValueEncoding::Normal(id)
        }
    };
    Ok(OnDiskToken {
        last: false,
        spelling_correction: token.attribute.contains(TokenAttribute::SPELLING_CORRECTION),
        pos,
        cost,
        value,
    })
}

/// キートライのID順にトークン列を並べ、終端レコードを付けて配列にします。
fn encode_token_array(
    keys: &[KeyInfo],
    num_keys: usize,
    config: TokenArrayConfig,
) -> Result<Vec<u8>> {
    let mut records: Vec<Option<Vec<u8>>> = vec![None; num_keys];
    for key in keys {
        let id = key
            .id_in_key_trie
            .map(usize::from_u32)
            .filter(|&id| id < num_keys)
            .ok_or_else(|| KanadicError::invalid_state("key id is out of range", key.key.clone()))?;
        if records[id].is_some() {
            return Err(KanadicError::invalid_state(
                "two keys share a key id",
                key.key.clone(),
            ));
        }
        let tokens = key
            .tokens
            .iter()
            .map(to_on_disk)
            .collect::<Result<Vec<_>>>()?;
        records[id] = Some(encode_token_list(&tokens)?);
    }

    let mut builder = BitVectorBasedArrayBuilder::new(config)?;
    for (id, record) in records.iter().enumerate() {
        let record = record.as_ref().ok_or_else(|| {
            KanadicError::invalid_state("no tokens for a key id", id.to_string())
        })?;
        builder.push(record);
    }
    builder.push(&[TOKEN_TERMINATION]);
    builder.build()
}

/// 構築済みの辞書
#[derive(Clone, Debug)]
pub struct BuiltDictionary {
    value_trie: Vec<u8>,
    token_array: Vec<u8>,
    key_trie: Vec<u8>,
    frequent_pos: Vec<u8>,
    stats: BuildStats,
}

impl BuiltDictionary {
    /// コンテナを書き出します。
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        self.sections().write(wtr)
    }

    /// コンテナのバイト列を返します。
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = vec![];
        self.write(&mut out)?;
        Ok(out)
    }

    #[inline(always)]
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    fn sections(&self) -> Sections<'_> {
        Sections {
            value: &self.value_trie,
            token: &self.token_array,
            key: &self.key_trie,
            frequent_pos: &self.frequent_pos,
        }
    }
}

/// 構築の統計
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BuildStats {
    pub num_tokens: usize,
    pub num_keys: usize,
    /// 値トライに載った異なる値の数
    pub num_values: usize,
    pub num_frequent_pos: usize,
    /// 頻出品詞として採用された最小の出現回数
    pub frequency_threshold: Option<usize>,
    pub num_small_cost_keys: usize,
    pub value_trie_bytes: usize,
    pub key_trie_bytes: usize,
    pub token_array_bytes: usize,
}

impl fmt::Display for BuildStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "tokens: {}", self.num_tokens)?;
        writeln!(f, "keys: {}", self.num_keys)?;
        writeln!(f, "values: {}", self.num_values)?;
        match self.frequency_threshold {
            Some(t) => writeln!(
                f,
                "frequent pos: {} (threshold {t})",
                self.num_frequent_pos
            )?,
            None => writeln!(f, "frequent pos: 0")?,
        }
        writeln!(f, "small cost keys: {}", self.num_small_cost_keys)?;
        writeln!(f, "value trie: {} bytes", self.value_trie_bytes)?;
        writeln!(f, "key trie: {} bytes", self.key_trie_bytes)?;
        write!(f, "token array: {} bytes", self.token_array_bytes)
    }
}
