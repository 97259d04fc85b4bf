//! 辞書コンテナのフレーミング
//!
//! リトルエンディアンの`magic`と`seed`に続いて、
//! `{長さ(i32), タグ(4バイト), ペイロード, 4バイト境界までの0埋め}`のセクションを並べ、
//! 長さ0で終端します。タグは1文字の名前をUTF-32LEで表したものです。

use std::io::Write;

use crate::errors::{KanadicError, Result};
use crate::utils::{read_len_le, read_u32_le};

/// コンテナの先頭に置く識別子
pub const FILE_MAGIC: i32 = 20110701;

/// `FILE_MAGIC`の直後に置く識別子
pub const SEED: i32 = 2135654146;

/// セクションの種類
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SectionKind {
    /// 値トライ
    Value,
    /// トークンレコード配列
    Token,
    /// キートライ
    Key,
    /// 頻出品詞テーブル
    FrequentPos,
}

impl SectionKind {
    /// 書き出す順序
    pub const ALL: [Self; 4] = [Self::Value, Self::Token, Self::Key, Self::FrequentPos];

    #[inline(always)]
    pub const fn name(self) -> char {
        match self {
            Self::Value => 'v',
            Self::Token => 't',
            Self::Key => 'k',
            Self::FrequentPos => 'p',
        }
    }

    #[inline(always)]
    pub fn tag(self) -> [u8; 4] {
        u32::from(self.name()).to_le_bytes()
    }

    pub fn from_tag(tag: [u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

/// 4つのセクションのペイロード
#[derive(Clone, Copy, Debug)]
pub struct Sections<'a> {
    pub value: &'a [u8],
    pub token: &'a [u8],
    pub key: &'a [u8],
    pub frequent_pos: &'a [u8],
}

impl<'a> Sections<'a> {
    #[inline(always)]
    pub const fn get(&self, kind: SectionKind) -> &'a [u8] {
        match kind {
            SectionKind::Value => self.value,
            SectionKind::Token => self.token,
            SectionKind::Key => self.key,
            SectionKind::FrequentPos => self.frequent_pos,
        }
    }

    /// 固定の順序でコンテナを書き出します。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(&FILE_MAGIC.to_le_bytes())?;
        wtr.write_all(&SEED.to_le_bytes())?;
        for kind in SectionKind::ALL {
            let payload = self.get(kind);
            let len = i32::try_from(payload.len()).map_err(|_| {
                KanadicError::out_of_range("section length", payload.len() as u64, i32::MAX as u64)
            })?;
            if len == 0 {
                return Err(KanadicError::invalid_argument(
                    "sections",
                    format!("section '{}' is empty", kind.name()),
                ));
            }
            wtr.write_all(&len.to_le_bytes())?;
            wtr.write_all(&kind.tag())?;
            wtr.write_all(payload)?;
            let pad = (4 - payload.len() % 4) % 4;
            wtr.write_all(&[0; 3][..pad])?;
        }
        wtr.write_all(&0i32.to_le_bytes())?;
        Ok(())
    }

    /// コンテナを検証し、各セクションのペイロードを借用して返します。
    ///
    /// セクションの順序は問いませんが、4種類すべてがちょうど1回ずつ現れる必要があります。
    ///
    /// # エラー
    ///
    /// 識別子の不一致、未知・重複・欠落したセクション、途中で切れたペイロード、
    /// 終端の欠落は[`KanadicError::MalformedContainer`]になります。
    pub fn read(bytes: &'a [u8]) -> Result<Self> {
        let magic = read_u32_le(bytes, 0)
            .ok_or_else(|| KanadicError::malformed("container", "missing magic"))?;
        let seed = read_u32_le(bytes, 4)
            .ok_or_else(|| KanadicError::malformed("container", "missing seed"))?;
        if magic != FILE_MAGIC as u32 || seed != SEED as u32 {
            return Err(KanadicError::malformed(
                "container",
                format!("unexpected magic {magic:#x} / seed {seed:#x}"),
            ));
        }

        let mut found: [Option<&'a [u8]>; 4] = [None; 4];
        let mut offset = 8;
        loop {
            let len = read_len_le(bytes, offset, "container")?;
            offset += 4;
            if len == 0 {
                break;
            }
            let tag = bytes
                .get(offset..offset + 4)
                .and_then(|t| <[u8; 4]>::try_from(t).ok())
                .ok_or_else(|| KanadicError::malformed("container", "truncated section tag"))?;
            offset += 4;
            let kind = SectionKind::from_tag(tag).ok_or_else(|| {
                KanadicError::malformed("container", format!("unknown section tag {tag:?}"))
            })?;
            let payload = bytes.get(offset..offset + len).ok_or_else(|| {
                KanadicError::malformed(
                    "container",
                    format!("section '{}' is truncated", kind.name()),
                )
            })?;
            let slot = &mut found[kind as usize];
            if slot.is_some() {
                return Err(KanadicError::malformed(
                    "container",
                    format!("duplicate section '{}'", kind.name()),
                ));
            }
            *slot = Some(payload);
            offset += len.div_ceil(4) * 4;
        }

        let take = |kind: SectionKind| {
            found[kind as usize].ok_or_else(|| {
                KanadicError::malformed("container", format!("missing section '{}'", kind.name()))
            })
        };
        Ok(Self {
            value: take(SectionKind::Value)?,
            token: take(SectionKind::Token)?,
            key: take(SectionKind::Key)?,
            frequent_pos: take(SectionKind::FrequentPos)?,
        })
    }
}
