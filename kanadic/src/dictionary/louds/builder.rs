//! LOUDSトライのビルダー
//!
//! キーを辞書順(共通接頭辞を持つ場合は短い方が先)に並べて重複を除き、
//! 深さごとに幅優先でノードを出力します。終端ノードには出力順にIDを振るため、
//! IDは終端ビットのrankと一致します。

use crate::dictionary::louds::trie::{BITS_PER_EDGE_LABEL, HEADER_LEN};
use crate::errors::{KanadicError, Result};
use crate::succinct::BitStream;
use crate::utils::push_len_le;

/// キーを集めるビルダー
#[derive(Default)]
pub struct LoudsTrieBuilder {
    keys: Vec<Vec<u8>>,
}

impl LoudsTrieBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// キーを追加します。重複は構築時に取り除かれます。
    #[inline(always)]
    pub fn push<K>(&mut self, key: K)
    where
        K: Into<Vec<u8>>,
    {
        self.keys.push(key.into());
    }

    /// トライのイメージを構築します。
    ///
    /// # エラー
    ///
    /// 空のキーが含まれる場合は[`KanadicError::InvalidArgument`]を、
    /// IDが割り当てられないキーが残った場合は[`KanadicError::InvalidState`]を返します。
    pub fn build(mut self) -> Result<BuiltLoudsTrie> {
        if self.keys.iter().any(|k| k.is_empty()) {
            return Err(KanadicError::invalid_argument(
                "key",
                "a trie key must not be empty",
            ));
        }
        self.keys.sort_unstable();
        self.keys.dedup();
        let keys = self.keys;

        let mut louds = BitStream::new();
        let mut terminal = BitStream::new();
        let mut edges = vec![];
        let mut ids = vec![None; keys.len()];
        let mut next_id = 0u32;

        // super root
        louds.push(true);
        louds.push(false);
        terminal.push(false);
        edges.push(0);

        let mut live: Vec<usize> = (0..keys.len()).collect();
        let mut depth = 0;
        while !live.is_empty() {
            for (i, &k) in live.iter().enumerate() {
                let word = &keys[k];
                if word.len() > depth {
                    let starts_run = i == 0 || {
                        let prev = &keys[live[i - 1]];
                        prev.len() <= depth || prev[..=depth] != word[..=depth]
                    };
                    if starts_run {
                        louds.push(true);
                        edges.push(word[depth]);
                        if word.len() == depth + 1 {
                            terminal.push(true);
                            ids[k] = Some(next_id);
                            next_id += 1;
                        } else {
                            terminal.push(false);
                        }
                    }
                }
                let ends_parent = live
                    .get(i + 1)
                    .map_or(true, |&next| keys[next][..depth] != word[..depth]);
                if ends_parent {
                    louds.push(false);
                }
            }
            live.retain(|&k| keys[k].len() > depth);
            depth += 1;
        }

        if let Some(missing) = ids.iter().position(Option::is_none) {
            return Err(KanadicError::invalid_state(
                "trie key without id",
                format!("{:?}", keys[missing]),
            ));
        }

        let louds = louds.into_bytes();
        let terminal = terminal.into_bytes();
        let mut image = Vec::with_capacity(HEADER_LEN + louds.len() + terminal.len() + edges.len());
        push_len_le(&mut image, louds.len(), "louds length")?;
        push_len_le(&mut image, terminal.len(), "terminal length")?;
        push_len_le(&mut image, BITS_PER_EDGE_LABEL, "edge label width")?;
        push_len_le(&mut image, edges.len(), "edge label count")?;
        image.extend_from_slice(&louds);
        image.extend_from_slice(&terminal);
        image.extend_from_slice(&edges);

        Ok(BuiltLoudsTrie { image, keys, ids })
    }
}

/// 構築済みのトライイメージとキーのID表
pub struct BuiltLoudsTrie {
    image: Vec<u8>,
    // sorted and deduplicated
    keys: Vec<Vec<u8>>,
    ids: Vec<Option<u32>>,
}

impl BuiltLoudsTrie {
    /// キーのIDを返します。登録されていないキーには`None`を返します。
    pub fn get_id(&self, key: &[u8]) -> Option<u32> {
        let i = self.keys.binary_search_by(|k| k.as_slice().cmp(key)).ok()?;
        self.ids[i]
    }

    /// 登録されたキーの数
    #[inline(always)]
    pub fn num_keys(&self) -> usize {
        self.keys.len()
    }

    #[inline(always)]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn into_image(self) -> Vec<u8> {
        self.image
    }
}
