//! 辞書エントリの型定義
//!
//! [`Token`]は辞書ソースの1行に対応する不変のレコードです。
//! ビルダーの内部では、エンコード方法の決定結果を[`TokenInfo`]として付加します。

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::errors::{KanadicError, Result};
use crate::num::{CombinedPos, PosId, COST_MAX};

/// トークンの属性フラグ
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TokenAttribute(u8);

impl TokenAttribute {
    /// 属性なし
    pub const NONE: Self = Self(0);
    /// 誤変換を訂正するためのエントリ
    pub const SPELLING_CORRECTION: Self = Self(1);
    /// 接尾辞辞書由来
    pub const SUFFIX_DICTIONARY: Self = Self(1 << 6);
    /// ユーザー辞書由来
    pub const USER_DICTIONARY: Self = Self(1 << 7);

    #[inline(always)]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TokenAttribute {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TokenAttribute {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for TokenAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut names = vec![];
        if self.contains(Self::SPELLING_CORRECTION) {
            names.push("SPELLING_CORRECTION");
        }
        if self.contains(Self::SUFFIX_DICTIONARY) {
            names.push("SUFFIX_DICTIONARY");
        }
        if self.contains(Self::USER_DICTIONARY) {
            names.push("USER_DICTIONARY");
        }
        if names.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

/// 辞書エントリ
///
/// 読み(キー)、表記(値)、コスト、左右の文法IDと属性を保持します。
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Token {
    /// 読み
    pub key: String,
    /// 表記
    pub value: String,
    /// 単語コスト(0..=0x7fff)
    pub cost: u16,
    /// 左文脈ID(0..=0x0fff)
    pub left_id: u16,
    /// 右文脈ID(0..=0x0fff)
    pub right_id: u16,
    /// 属性
    pub attribute: TokenAttribute,
}

impl Token {
    /// 新しいトークンを作成します。
    pub fn new<K, V>(key: K, value: V, cost: u16, left_id: u16, right_id: u16) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
            cost,
            left_id,
            right_id,
            attribute: TokenAttribute::NONE,
        }
    }

    /// 属性を設定したトークンを返します。
    pub fn with_attribute(mut self, attribute: TokenAttribute) -> Self {
        self.attribute = attribute;
        self
    }

    /// 各フィールドがオンディスク表現のビット幅に収まるか検査し、
    /// まとめた品詞を返します。
    ///
    /// # エラー
    ///
    /// IDまたはコストが範囲外の場合、[`KanadicError::ValueOutOfRange`]を返します。
    pub fn validate(&self) -> Result<CombinedPos> {
        let left = PosId::new(self.left_id).ok_or_else(|| {
            KanadicError::out_of_range("left_id", self.left_id.into(), PosId::MAX.get().into())
        })?;
        let right = PosId::new(self.right_id).ok_or_else(|| {
            KanadicError::out_of_range("right_id", self.right_id.into(), PosId::MAX.get().into())
        })?;
        if self.cost > COST_MAX {
            return Err(KanadicError::out_of_range(
                "cost",
                self.cost.into(),
                COST_MAX.into(),
            ));
        }
        Ok(CombinedPos::new(left, right))
    }
}

/// 値のエンコード方法
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ValueType {
    /// 値トライのIDを格納する
    #[default]
    Default,
    /// 直前のトークンと同じ値
    SameAsPrev,
    /// 読みと同じ(ひらがな)
    AsIsHiragana,
    /// 読みをカタカナにしたもの
    AsIsKatakana,
}

impl ValueType {
    #[inline(always)]
    pub const fn is_as_is(self) -> bool {
        matches!(self, Self::AsIsHiragana | Self::AsIsKatakana)
    }
}

/// 品詞のエンコード方法
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum PosType {
    /// 左右のIDをそのまま格納する
    #[default]
    Default,
    /// 頻出品詞テーブルのIDを格納する
    FrequentPos,
    /// 直前のトークンと同じ品詞
    SameAsPrev,
}

/// コストのエンコード方法
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum CostType {
    /// 2バイト
    #[default]
    Default,
    /// 上位8ビットのみの1バイト
    CanUseSmallEncoding,
}

/// ビルダーがトークンに付加するエンコード情報
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenInfo {
    pub token: Token,
    pub value_type: ValueType,
    pub pos_type: PosType,
    pub cost_type: CostType,
    /// 値トライ中のID(値トライに載らないトークンは`None`)
    pub id_in_value_trie: Option<u32>,
    /// 頻出品詞テーブル中のID
    pub id_in_frequent_pos_map: Option<u8>,
}

impl TokenInfo {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            value_type: ValueType::Default,
            pos_type: PosType::Default,
            cost_type: CostType::Default,
            id_in_value_trie: None,
            id_in_frequent_pos_map: None,
        }
    }

    #[inline(always)]
    pub fn combined_pos(&self) -> CombinedPos {
        // Validated when the token entered the builder.
        CombinedPos::new(
            PosId::new(self.token.left_id).unwrap_or(PosId::MAX),
            PosId::new(self.token.right_id).unwrap_or(PosId::MAX),
        )
    }
}

/// 1つの読みと、それに属するトークンの一覧
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyInfo {
    pub key: String,
    pub tokens: Vec<TokenInfo>,
    /// キートライ中のID
    pub id_in_key_trie: Option<u32>,
}

impl KeyInfo {
    pub fn new(key: String) -> Self {
        Self {
            key,
            tokens: vec![],
            id_in_key_trie: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_flags() {
        let attr = TokenAttribute::SPELLING_CORRECTION | TokenAttribute::USER_DICTIONARY;
        assert!(attr.contains(TokenAttribute::SPELLING_CORRECTION));
        assert!(!attr.contains(TokenAttribute::SUFFIX_DICTIONARY));
        assert_eq!(0x81, attr.bits());
        assert_eq!("SPELLING_CORRECTION|USER_DICTIONARY", format!("{attr:?}"));
    }

    #[test]
    fn test_validate_range() {
        assert!(Token::new("a", "a", 0x7fff, 0xfff, 0).validate().is_ok());
        assert!(Token::new("a", "a", 0x8000, 0, 0).validate().is_err());
        assert!(Token::new("a", "a", 0, 0x1000, 0).validate().is_err());
        assert!(Token::new("a", "a", 0, 0, 0x1000).validate().is_err());
    }
}
