//! 索引キャッシュとレコード配列の設定
//!
//! いずれの設定も検索結果には影響せず、ロード時のメモリ量と検索速度の
//! トレードオフだけを変えます。ただし[`TokenArrayConfig`]はビルド時に
//! ファイルへ書き込まれ、ロード時にはファイル側の値が使われます。

/// ビットベクトル索引の下限キャッシュの設定
///
/// 各値はキャッシュのエントリ数です。0の場合はキャッシュを持たず、
/// 毎回チャンク表全体を探索します。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BitVectorCacheConfig {
    /// `select0`用キャッシュのエントリ数
    pub lb0_cache_size: usize,
    /// `select1`用キャッシュのエントリ数
    pub lb1_cache_size: usize,
}

impl BitVectorCacheConfig {
    /// キャッシュなし
    pub const NONE: Self = Self {
        lb0_cache_size: 0,
        lb1_cache_size: 0,
    };

    /// 可変長レコード配列の索引に使う設定
    pub const TOKEN_ARRAY: Self = Self {
        lb0_cache_size: 1024,
        lb1_cache_size: 0,
    };
}

impl Default for BitVectorCacheConfig {
    fn default() -> Self {
        Self {
            lb0_cache_size: 1024,
            lb1_cache_size: 1024,
        }
    }
}

/// LOUDSトライの索引設定
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LoudsCacheConfig {
    /// LOUDSビット列の索引
    pub louds: BitVectorCacheConfig,
    /// `select0(i)+1`を事前計算する個数
    pub select0_cache_size: usize,
    /// `select1(i)`を事前計算する個数
    pub select1_cache_size: usize,
    /// 終端ビット列の`select1`用キャッシュのエントリ数
    pub terminal_lb1_cache_size: usize,
}

impl LoudsCacheConfig {
    /// キートライ用
    pub const KEY_TRIE: Self = Self {
        louds: BitVectorCacheConfig {
            lb0_cache_size: 1024,
            lb1_cache_size: 1024,
        },
        select0_cache_size: 4096,
        select1_cache_size: 4096,
        terminal_lb1_cache_size: 1024,
    };

    /// 値トライ用
    ///
    /// 値の復元では親方向への移動が多いため、`select1`のキャッシュを大きく取ります。
    pub const VALUE_TRIE: Self = Self {
        louds: BitVectorCacheConfig {
            lb0_cache_size: 1024,
            lb1_cache_size: 1024,
        },
        select0_cache_size: 1024,
        select1_cache_size: 16384,
        terminal_lb1_cache_size: 4096,
    };

    /// キャッシュを一切持たない設定
    pub const NONE: Self = Self {
        louds: BitVectorCacheConfig::NONE,
        select0_cache_size: 0,
        select1_cache_size: 0,
        terminal_lb1_cache_size: 0,
    };

    /// 終端ビット列の索引設定
    #[inline(always)]
    pub(crate) const fn terminal(&self) -> BitVectorCacheConfig {
        BitVectorCacheConfig {
            lb0_cache_size: 0,
            lb1_cache_size: self.terminal_lb1_cache_size,
        }
    }
}

impl Default for LoudsCacheConfig {
    fn default() -> Self {
        Self::KEY_TRIE
    }
}

/// 可変長レコード配列のチャンク長
///
/// 長さLのレコードは、`base_length`バイトの基本チャンク1つと、
/// `ceil((L - base_length) / step_length)`個の`step_length`バイトのチャンクを占めます。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TokenArrayConfig {
    pub base_length: usize,
    pub step_length: usize,
}

impl Default for TokenArrayConfig {
    fn default() -> Self {
        Self {
            base_length: 4,
            step_length: 1,
        }
    }
}
