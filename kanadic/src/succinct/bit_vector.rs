//! rank/select索引付きビットベクトル
//!
//! ビット列を32バイト(256ビット)のチャンクに区切り、各チャンク境界までの
//! 1ビットの累積数を保持します。`select`は下限キャッシュでチャンクの探索範囲を絞り、
//! 32ビットワード単位の数え上げ、最後にワード内のビット走査の順で位置を求めます。
//!
//! ビットは各バイトの最下位ビットから順に並び、ワードはリトルエンディアンで読みます。

use crate::dictionary::config::BitVectorCacheConfig;
use crate::errors::{KanadicError, Result};
use crate::utils::FromU32;

const CHUNK_BYTES: usize = 32;
const CHUNK_BITS: usize = CHUNK_BYTES * 8;
const CHUNK_WORDS: usize = CHUNK_BYTES / 4;

/// 借用したビット列の上に構築するrank/select索引
///
/// `select0`と`select1`の引数`n`は1始まりで、それぞれ0ビット・1ビットの総数以下で
/// なければなりません。範囲外の呼び出しはパニックするか、意味のない値を返します。
#[derive(Clone, Debug)]
pub struct SuccinctBitVectorIndex<'a> {
    data: &'a [u8],
    // index[k] = number of ones in chunks [0, k)
    index: Vec<u32>,
    lb0: LowerBoundCache,
    lb1: LowerBoundCache,
}

/// n番目のビットを含むチャンクの下限を間引いて記録したもの
#[derive(Clone, Debug, Default)]
struct LowerBoundCache {
    increment: usize,
    chunks: Vec<u32>,
}

impl LowerBoundCache {
    /// `count_before(c)`はチャンクcより前にある対象ビットの数
    fn build<F>(size: usize, total: usize, num_chunks: usize, count_before: F) -> Self
    where
        F: Fn(usize) -> usize,
    {
        if size == 0 || total == 0 {
            return Self::default();
        }
        let increment = (total / size).max(1);
        let mut chunks = vec![];
        let mut c = 0;
        let mut target = 1;
        while target <= total {
            while c + 1 < num_chunks && count_before(c + 1) < target {
                c += 1;
            }
            chunks.push(c as u32);
            target += increment;
        }
        Self { increment, chunks }
    }

    /// n番目のビットを含むチャンクの範囲 `[lo, hi]`
    #[inline(always)]
    fn range(&self, n: usize, num_chunks: usize) -> (usize, usize) {
        let last = num_chunks.saturating_sub(1);
        if self.chunks.is_empty() {
            return (0, last);
        }
        let j = (n - 1) / self.increment;
        let lo = self.chunks.get(j).map_or(last, |&c| usize::from_u32(c));
        let hi = self.chunks.get(j + 1).map_or(last, |&c| usize::from_u32(c));
        (lo, hi)
    }
}

impl<'a> SuccinctBitVectorIndex<'a> {
    /// ビット列から索引を構築します。
    ///
    /// # エラー
    ///
    /// `data`の長さが4の倍数でない場合、[`KanadicError::MalformedContainer`]を返します。
    pub fn new(data: &'a [u8], config: BitVectorCacheConfig) -> Result<Self> {
        if data.len() % 4 != 0 {
            return Err(KanadicError::malformed(
                "bit vector",
                format!("length {} is not a multiple of 4", data.len()),
            ));
        }
        let num_chunks = data.len().div_ceil(CHUNK_BYTES);
        let mut index = Vec::with_capacity(num_chunks + 1);
        let mut acc = 0u32;
        index.push(acc);
        for chunk in data.chunks(CHUNK_BYTES) {
            acc += chunk.iter().map(|b| b.count_ones()).sum::<u32>();
            index.push(acc);
        }

        let mut bv = Self {
            data,
            index,
            lb0: LowerBoundCache::default(),
            lb1: LowerBoundCache::default(),
        };
        let num_ones = bv.num_ones();
        let num_zeros = bv.num_zeros();
        bv.lb1 = LowerBoundCache::build(config.lb1_cache_size, num_ones, num_chunks, |c| {
            usize::from_u32(bv.index[c])
        });
        bv.lb0 = LowerBoundCache::build(config.lb0_cache_size, num_zeros, num_chunks, |c| {
            bv.zeros_before_chunk(c)
        });
        Ok(bv)
    }

    /// 元のビット列
    #[inline(always)]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// ビット長
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.data.len() * 8
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// i番目のビット
    #[inline(always)]
    pub fn get(&self, i: usize) -> bool {
        (self.data[i / 8] >> (i % 8)) & 1 == 1
    }

    /// 1ビットの総数
    #[inline(always)]
    pub fn num_ones(&self) -> usize {
        self.index.last().map_or(0, |&n| usize::from_u32(n))
    }

    /// 0ビットの総数
    #[inline(always)]
    pub fn num_zeros(&self) -> usize {
        self.len() - self.num_ones()
    }

    #[inline(always)]
    fn word(&self, w: usize) -> u32 {
        let b = &self.data[w * 4..w * 4 + 4];
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    #[inline(always)]
    fn num_words(&self) -> usize {
        self.data.len() / 4
    }

    #[inline(always)]
    fn zeros_before_chunk(&self, c: usize) -> usize {
        (c * CHUNK_BITS).min(self.len()) - usize::from_u32(self.index[c])
    }

    /// `[0, n)`に含まれる1ビットの数
    ///
    /// `n`はビット長以下でなければなりません。
    pub fn rank1(&self, n: usize) -> usize {
        let chunk = n / CHUNK_BITS;
        let mut rank = usize::from_u32(self.index[chunk]);
        let last_word = n / 32;
        for w in chunk * CHUNK_WORDS..last_word {
            rank += self.word(w).count_ones() as usize;
        }
        let rest = n % 32;
        if rest != 0 {
            let mask = (1u32 << rest) - 1;
            rank += (self.word(last_word) & mask).count_ones() as usize;
        }
        rank
    }

    /// `[0, n)`に含まれる0ビットの数
    #[inline(always)]
    pub fn rank0(&self, n: usize) -> usize {
        n - self.rank1(n)
    }

    /// n番目(1始まり)の1ビットの位置
    pub fn select1(&self, n: usize) -> usize {
        let (lo, hi) = self.lb1.range(n, self.index.len() - 1);
        let chunk = self.find_chunk(lo, hi, n, |c| usize::from_u32(self.index[c]));
        let rest = n - usize::from_u32(self.index[chunk]);
        self.scan_words(chunk, rest, |w| w)
    }

    /// n番目(1始まり)の0ビットの位置
    pub fn select0(&self, n: usize) -> usize {
        let (lo, hi) = self.lb0.range(n, self.index.len() - 1);
        let chunk = self.find_chunk(lo, hi, n, |c| self.zeros_before_chunk(c));
        let rest = n - self.zeros_before_chunk(chunk);
        self.scan_words(chunk, rest, |w| !w)
    }

    /// `count_before(c) < n`を満たす`[lo, hi]`内の最大のチャンク
    #[inline(always)]
    fn find_chunk<F>(&self, mut lo: usize, mut hi: usize, n: usize, count_before: F) -> usize
    where
        F: Fn(usize) -> usize,
    {
        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            if count_before(mid) < n {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        lo
    }

    fn scan_words<F>(&self, chunk: usize, mut rest: usize, f: F) -> usize
    where
        F: Fn(u32) -> u32,
    {
        let end = ((chunk + 1) * CHUNK_WORDS).min(self.num_words());
        let mut w = chunk * CHUNK_WORDS;
        while w < end {
            let word = f(self.word(w));
            let count = word.count_ones() as usize;
            if rest <= count {
                return w * 32 + select_in_word(word, rest);
            }
            rest -= count;
            w += 1;
        }
        // Out of range; the caller violated the precondition.
        self.len()
    }
}

/// ワード中のr番目(1始まり)の1ビットの位置
#[inline(always)]
fn select_in_word(mut word: u32, r: usize) -> usize {
    for _ in 1..r {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}
