//! ビット幅が制限された整数型を提供するモジュール
//!
//! 辞書のオンディスク表現では、品詞IDは12ビット、コストは15ビット、
//! 値トライのIDは22ビットに収まる必要があります。

/// 0から0x0fffまでの文法ID(左文脈ID・右文脈ID)を表現する型
#[derive(Clone, Copy, Default, Eq, PartialEq, Debug, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct PosId(u16);

impl PosId {
    /// PosId型で表現可能な最大値
    pub const MAX: Self = Self(0x0fff);

    /// 指定されたu16値からPosIdを生成する
    ///
    /// # 例
    ///
    /// ```
    /// # use kanadic::num::PosId;
    /// assert!(PosId::new(0x0fff).is_some());
    /// assert!(PosId::new(0x1000).is_none());
    /// ```
    #[inline(always)]
    pub const fn new(x: u16) -> Option<Self> {
        if x <= Self::MAX.get() {
            Some(Self(x))
        } else {
            None
        }
    }

    /// 内部のu16値を取得する
    #[inline(always)]
    pub const fn get(self) -> u16 {
        self.0
    }
}

/// 左右の文法IDを1つの32ビット値にまとめたもの
///
/// `(left_id << 16) | right_id`の順序は、左IDを優先した辞書順と一致します。
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct CombinedPos(u32);

impl CombinedPos {
    /// 左右のIDから生成する
    #[inline(always)]
    pub const fn new(left_id: PosId, right_id: PosId) -> Self {
        Self(((left_id.get() as u32) << 16) | right_id.get() as u32)
    }

    /// 頻出品詞テーブルに格納された生の値から復元する
    ///
    /// いずれかのIDが12ビットを超える場合は`None`を返します。
    #[inline(always)]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        if (raw >> 16) > PosId::MAX.get() as u32 || (raw & 0xffff) > PosId::MAX.get() as u32 {
            None
        } else {
            Some(Self(raw))
        }
    }

    #[inline(always)]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub const fn left_id(self) -> u16 {
        (self.0 >> 16) as u16
    }

    #[inline(always)]
    pub const fn right_id(self) -> u16 {
        (self.0 & 0xffff) as u16
    }
}

/// コストの最大値
pub const COST_MAX: u16 = 0x7fff;

/// 値トライIDの最大値
pub const VALUE_TRIE_ID_MAX: u32 = 0x3f_ffff;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_pos_order() {
        let a = CombinedPos::new(PosId::new(1).unwrap(), PosId::new(0xfff).unwrap());
        let b = CombinedPos::new(PosId::new(2).unwrap(), PosId::new(0).unwrap());
        assert!(a < b);
        assert_eq!(1, a.left_id());
        assert_eq!(0xfff, a.right_id());
    }

    #[test]
    fn test_combined_pos_from_raw() {
        assert!(CombinedPos::from_raw(0x0fff_0fff).is_some());
        assert!(CombinedPos::from_raw(0x1000_0000).is_none());
        assert!(CombinedPos::from_raw(0x0000_1000).is_none());
    }
}
