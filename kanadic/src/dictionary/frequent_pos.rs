//! 頻出品詞テーブル
//!
//! 出現頻度の高い`(左ID, 右ID)`の組に1バイトのIDを割り当てます。
//! テーブルは256個のリトルエンディアン`u32`で、未使用のエントリは0です。

use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::errors::{KanadicError, Result};
use crate::num::CombinedPos;
use crate::utils::read_u32_le;

/// テーブルのエントリ数
pub const TABLE_SIZE: usize = 256;

/// 割り当てる組の上限
const MAX_ENTRIES: usize = 255;

/// ビルダーが使う、品詞からIDへの写像
#[derive(Clone, Debug, Default)]
pub struct FrequentPosMap {
    ids: HashMap<CombinedPos, u8>,
    // ascending; index is the id
    entries: Vec<CombinedPos>,
    threshold: usize,
}

impl FrequentPosMap {
    /// 品詞の出現列からテーブルを作ります。
    ///
    /// 同じ頻度の組はまとめて扱い、頻度の高い順に、合計が255を超えない範囲で採用します。
    /// 採用した組には品詞の昇順にIDを振ります。
    ///
    /// # エラー
    ///
    /// 採用した組の数が集計と一致しない場合、
    /// [`KanadicError::InconsistentFrequentPosResult`]を返します。
    pub fn build<I>(positions: I) -> Result<Self>
    where
        I: IntoIterator<Item = CombinedPos>,
    {
        let mut frequencies: HashMap<CombinedPos, usize> = HashMap::new();
        for pos in positions {
            *frequencies.entry(pos).or_insert(0) += 1;
        }

        // frequency -> number of pairs with that frequency
        let mut buckets: BTreeMap<usize, usize> = BTreeMap::new();
        for &freq in frequencies.values() {
            *buckets.entry(freq).or_insert(0) += 1;
        }

        let mut expected = 0;
        let mut threshold = usize::MAX;
        for (&freq, &count) in buckets.iter().rev() {
            if expected + count > MAX_ENTRIES {
                break;
            }
            expected += count;
            threshold = freq;
        }

        let mut entries: Vec<CombinedPos> = frequencies
            .iter()
            .filter(|&(_, &freq)| freq >= threshold)
            .map(|(&pos, _)| pos)
            .collect();
        entries.sort_unstable();
        if entries.len() != expected {
            return Err(KanadicError::InconsistentFrequentPosResult {
                expected,
                actual: entries.len(),
            });
        }

        let ids = entries
            .iter()
            .enumerate()
            .map(|(i, &pos)| (pos, i as u8))
            .collect();
        Ok(Self {
            ids,
            entries,
            threshold,
        })
    }

    #[inline(always)]
    pub fn get(&self, pos: CombinedPos) -> Option<u8> {
        self.ids.get(&pos).copied()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 採用された最小の頻度(採用なしの場合は`None`)
    pub fn threshold(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.threshold)
    }

    /// テーブルのイメージ
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(TABLE_SIZE * 4);
        for i in 0..TABLE_SIZE {
            let raw = self.entries.get(i).map_or(0, |pos| pos.raw());
            out.extend_from_slice(&raw.to_le_bytes());
        }
        out
    }
}

/// ロード済みのテーブル
#[derive(Clone, Debug)]
pub struct FrequentPosTable {
    entries: Vec<CombinedPos>,
}

impl FrequentPosTable {
    /// # エラー
    ///
    /// 長さが`256 * 4`バイトでない場合、またはIDが12ビットを超えるエントリがある場合に
    /// [`KanadicError::MalformedContainer`]を返します。
    pub fn new(image: &[u8]) -> Result<Self> {
        if image.len() != TABLE_SIZE * 4 {
            return Err(KanadicError::malformed(
                "frequent pos",
                format!("expected {} bytes, got {}", TABLE_SIZE * 4, image.len()),
            ));
        }
        let mut entries = Vec::with_capacity(TABLE_SIZE);
        for i in 0..TABLE_SIZE {
            let raw = read_u32_le(image, i * 4).unwrap_or_default();
            let pos = CombinedPos::from_raw(raw).ok_or_else(|| {
                KanadicError::malformed("frequent pos", format!("entry {i} is {raw:#x}"))
            })?;
            entries.push(pos);
        }
        Ok(Self { entries })
    }

    #[inline(always)]
    pub fn get(&self, id: u8) -> CombinedPos {
        self.entries[usize::from(id)]
    }
}
