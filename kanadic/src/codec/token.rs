//! トークンレコードのコーデック
//!
//! 1トークンは3〜9バイトで、先頭のフラグバイト、品詞、コスト、値IDの順に並びます。
//!
//! フラグバイト:
//!
//! | ビット | 意味                                                |
//! |--------|-----------------------------------------------------|
//! | 0x80   | キーの最後のトークン                                |
//! | 0x40   | 値IDの上位6ビットを下位6ビットに詰め込んでいる      |
//! | 0x20   | 予約                                                |
//! | 0x10   | 誤変換訂正                                          |
//! | 0x0c   | 品詞(0x00 頻出, 0x04 完全, 0x08 左右同一, 0x0c 直前と同じ) |
//! | 0x03   | 値(0x00 通常, 0x01 ひらがな, 0x02 カタカナ, 0x03 直前と同じ) |
//!
//! 下位6ビットがすべて0になる組み合わせ(頻出品詞・通常の値・訂正なし)のときだけ、
//! 値IDの上位6ビットをフラグバイトに詰め込み、値IDを2バイトで表します。

use crate::errors::{KanadicError, Result};
use crate::num::{PosId, COST_MAX, VALUE_TRIE_ID_MAX};

const LAST_TOKEN: u8 = 0x80;
const CRAMMED_ID: u8 = 0x40;
const RESERVED: u8 = 0x20;
const SPELLING_CORRECTION: u8 = 0x10;
const LOWER_FLAGS_MASK: u8 = 0x3f;

const POS_MASK: u8 = 0x0c;
const POS_FREQUENT: u8 = 0x00;
const POS_FULL: u8 = 0x04;
const POS_MONO: u8 = 0x08;
const POS_SAME_AS_PREV: u8 = 0x0c;

const VALUE_MASK: u8 = 0x03;
const VALUE_NORMAL: u8 = 0x00;
const VALUE_AS_IS_HIRAGANA: u8 = 0x01;
const VALUE_AS_IS_KATAKANA: u8 = 0x02;
const VALUE_SAME_AS_PREV: u8 = 0x03;

const SMALL_COST_FLAG: u8 = 0x80;
const SMALL_COST_MASK: u8 = 0x7f;

/// キーのトークン列の後ろに置かれる終端レコード
pub const TOKEN_TERMINATION: u8 = 0xff;

/// 品詞の表現
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PosEncoding {
    /// 頻出品詞テーブルのID(1バイト)
    Frequent(u8),
    /// 12ビットずつ詰めた左右のID(3バイト)
    Full { left_id: u16, right_id: u16 },
    /// 左右が同じID(2バイト)
    Mono(u16),
    /// 直前のトークンと同じ(0バイト)
    SameAsPrev,
}

/// コストの表現
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CostEncoding {
    /// ビッグエンディアンの2バイト
    Normal(u16),
    /// 上位7ビットだけを残した1バイト
    ///
    /// 復号すると下位8ビットは0になります。
    Small(u16),
}

impl CostEncoding {
    #[inline(always)]
    pub const fn cost(self) -> u16 {
        match self {
            Self::Normal(c) | Self::Small(c) => c,
        }
    }
}

/// 値の表現
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueEncoding {
    /// 値トライのID
    Normal(u32),
    /// 読みと同じ
    AsIsHiragana,
    /// 読みをカタカナにしたもの
    AsIsKatakana,
    /// 直前のトークンと同じ
    SameAsPrev,
}

/// ディスク上の1トークン
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OnDiskToken {
    pub last: bool,
    pub spelling_correction: bool,
    pub pos: PosEncoding,
    pub cost: CostEncoding,
    pub value: ValueEncoding,
}

fn check_pos_id(field: &'static str, id: u16) -> Result<u16> {
    PosId::new(id)
        .map(PosId::get)
        .ok_or_else(|| KanadicError::out_of_range(field, id.into(), PosId::MAX.get().into()))
}

impl OnDiskToken {
    fn validate(&self) -> Result<()> {
        match self.pos {
            PosEncoding::Full { left_id, right_id } => {
                check_pos_id("left_id", left_id)?;
                check_pos_id("right_id", right_id)?;
            }
            PosEncoding::Mono(id) => {
                check_pos_id("pos_id", id)?;
            }
            PosEncoding::Frequent(_) | PosEncoding::SameAsPrev => (),
        }
        let cost = self.cost.cost();
        if cost > COST_MAX {
            return Err(KanadicError::out_of_range("cost", cost.into(), COST_MAX.into()));
        }
        if let ValueEncoding::Normal(id) = self.value {
            if id > VALUE_TRIE_ID_MAX {
                return Err(KanadicError::out_of_range(
                    "value id",
                    id.into(),
                    VALUE_TRIE_ID_MAX.into(),
                ));
            }
        }
        Ok(())
    }

    /// トークンを符号化して`out`に追加します。
    ///
    /// # エラー
    ///
    /// ID・コストがビット幅を超える場合、[`KanadicError::ValueOutOfRange`]を返します。
    /// その場合`out`は変更されません。
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        self.validate()?;

        let mut flags = 0;
        if self.last {
            flags |= LAST_TOKEN;
        }
        if self.spelling_correction {
            flags |= SPELLING_CORRECTION;
        }
        flags |= match self.pos {
            PosEncoding::Frequent(_) => POS_FREQUENT,
            PosEncoding::Full { .. } => POS_FULL,
            PosEncoding::Mono(_) => POS_MONO,
            PosEncoding::SameAsPrev => POS_SAME_AS_PREV,
        };
        flags |= match self.value {
            ValueEncoding::Normal(_) => VALUE_NORMAL,
            ValueEncoding::AsIsHiragana => VALUE_AS_IS_HIRAGANA,
            ValueEncoding::AsIsKatakana => VALUE_AS_IS_KATAKANA,
            ValueEncoding::SameAsPrev => VALUE_SAME_AS_PREV,
        };

        let mut crammed = false;
        if let ValueEncoding::Normal(id) = self.value {
            let upper = (id >> 16) as u8;
            // A crammed flag byte must never collide with the termination record.
            if flags & LOWER_FLAGS_MASK == 0 && flags | CRAMMED_ID | upper != TOKEN_TERMINATION {
                flags |= CRAMMED_ID | upper;
                crammed = true;
            }
        }
        out.push(flags);

        match self.pos {
            PosEncoding::Frequent(id) => out.push(id),
            PosEncoding::Full { left_id, right_id } => {
                out.extend_from_slice(&[
                    (left_id & 0xff) as u8,
                    ((right_id << 4) & 0xff) as u8 | (left_id >> 8) as u8,
                    (right_id >> 4) as u8,
                ]);
            }
            PosEncoding::Mono(id) => out.extend_from_slice(&id.to_le_bytes()),
            PosEncoding::SameAsPrev => (),
        }

        match self.cost {
            CostEncoding::Normal(c) => out.extend_from_slice(&c.to_be_bytes()),
            CostEncoding::Small(c) => out.push((c >> 8) as u8 | SMALL_COST_FLAG),
        }

        if let ValueEncoding::Normal(id) = self.value {
            let bytes = id.to_le_bytes();
            if crammed {
                out.extend_from_slice(&bytes[..2]);
            } else {
                out.extend_from_slice(&bytes[..3]);
            }
        }
        Ok(())
    }

    /// 先頭の1トークンを復号し、消費したバイト数とともに返します。
    ///
    /// # エラー
    ///
    /// 予約ビットが立っている場合やレコードが途中で切れている場合、
    /// [`KanadicError::InvalidFlagCombination`]を返します。
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        let flags = *bytes
            .first()
            .ok_or_else(|| KanadicError::invalid_flags(0, "empty record"))?;
        let mut reader = Reader {
            bytes,
            pos: 1,
            flags,
        };

        let crammed = flags & CRAMMED_ID != 0;
        let (pos_flags, value_flags, spelling_correction) = if crammed {
            (POS_FREQUENT, VALUE_NORMAL, false)
        } else {
            if flags & RESERVED != 0 {
                return Err(KanadicError::invalid_flags(flags, "reserved bit is set"));
            }
            (
                flags & POS_MASK,
                flags & VALUE_MASK,
                flags & SPELLING_CORRECTION != 0,
            )
        };

        let pos = match pos_flags {
            POS_FREQUENT => PosEncoding::Frequent(reader.byte()?),
            POS_FULL => {
                let [b0, b1, b2] = reader.array::<3>()?;
                PosEncoding::Full {
                    left_id: u16::from(b0) | (u16::from(b1 & 0x0f) << 8),
                    right_id: u16::from(b1 >> 4) | (u16::from(b2) << 4),
                }
            }
            POS_MONO => {
                let id = u16::from_le_bytes(reader.array::<2>()?);
                PosEncoding::Mono(check_pos_id("pos_id", id)?)
            }
            _ => PosEncoding::SameAsPrev,
        };

        let head = reader.byte()?;
        let cost = if head & SMALL_COST_FLAG != 0 {
            CostEncoding::Small(u16::from(head & SMALL_COST_MASK) << 8)
        } else {
            CostEncoding::Normal(u16::from_be_bytes([head, reader.byte()?]))
        };

        let value = match value_flags {
            VALUE_NORMAL if crammed => {
                let [b0, b1] = reader.array::<2>()?;
                let upper = u32::from(flags & LOWER_FLAGS_MASK);
                ValueEncoding::Normal(u32::from_le_bytes([b0, b1, 0, 0]) | (upper << 16))
            }
            VALUE_NORMAL => {
                let [b0, b1, b2] = reader.array::<3>()?;
                let id = u32::from_le_bytes([b0, b1, b2, 0]);
                if id > VALUE_TRIE_ID_MAX {
                    return Err(KanadicError::out_of_range(
                        "value id",
                        id.into(),
                        VALUE_TRIE_ID_MAX.into(),
                    ));
                }
                ValueEncoding::Normal(id)
            }
            VALUE_AS_IS_HIRAGANA => ValueEncoding::AsIsHiragana,
            VALUE_AS_IS_KATAKANA => ValueEncoding::AsIsKatakana,
            _ => ValueEncoding::SameAsPrev,
        };

        let token = Self {
            last: flags & LAST_TOKEN != 0,
            spelling_correction,
            pos,
            cost,
            value,
        };
        Ok((token, reader.pos))
    }

    #[inline(always)]
    const fn refers_to_prev(&self) -> bool {
        matches!(self.pos, PosEncoding::SameAsPrev) || matches!(self.value, ValueEncoding::SameAsPrev)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    flags: u8,
}

impl Reader<'_> {
    #[inline(always)]
    fn byte(&mut self) -> Result<u8> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| KanadicError::invalid_flags(self.flags, "truncated record"))?;
        self.pos += 1;
        Ok(b)
    }

    #[inline(always)]
    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0; N];
        for b in &mut out {
            *b = self.byte()?;
        }
        Ok(out)
    }
}

/// 1つのキーのトークン列を符号化します。
///
/// 最後のトークンには終了フラグが付けられます。入力側の`last`は無視されます。
///
/// # エラー
///
/// 先頭のトークンが直前のトークンを参照している場合は
/// [`KanadicError::InvalidFlagCombination`]を返します。
pub fn encode_token_list(tokens: &[OnDiskToken]) -> Result<Vec<u8>> {
    let mut out = vec![];
    if let Some(first) = tokens.first() {
        if first.refers_to_prev() {
            return Err(KanadicError::invalid_flags(
                0,
                "the first token of a key cannot refer to a previous token",
            ));
        }
    }
    for (i, token) in tokens.iter().enumerate() {
        let token = OnDiskToken {
            last: i + 1 == tokens.len(),
            ..*token
        };
        token.encode(&mut out)?;
    }
    Ok(out)
}

/// 1つのキーのトークン列を復号します。
///
/// 終了フラグの立ったトークン、または終端レコードで止まります。
pub fn decode_token_list(bytes: &[u8]) -> Result<Vec<OnDiskToken>> {
    let mut tokens = vec![];
    let mut offset = 0;
    loop {
        let rest = &bytes[offset..];
        match rest.first() {
            None => {
                return Err(KanadicError::invalid_flags(0, "token list is not terminated"));
            }
            Some(&TOKEN_TERMINATION) if tokens.is_empty() => break,
            Some(_) => (),
        }
        let (token, used) = OnDiskToken::decode(rest)?;
        if tokens.is_empty() && token.refers_to_prev() {
            return Err(KanadicError::invalid_flags(
                rest[0],
                "the first token of a key cannot refer to a previous token",
            ));
        }
        offset += used;
        tokens.push(token);
        if token.last {
            break;
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(pos: PosEncoding, cost: CostEncoding, value: ValueEncoding) -> OnDiskToken {
        OnDiskToken {
            last: false,
            spelling_correction: false,
            pos,
            cost,
            value,
        }
    }

    fn round_trip(t: OnDiskToken) -> Vec<u8> {
        let mut out = vec![];
        t.encode(&mut out).unwrap();
        let (decoded, used) = OnDiskToken::decode(&out).unwrap();
        assert_eq!(out.len(), used);
        assert_eq!(t, decoded);
        out
    }

    #[test]
    fn test_crammed_layout() {
        let bytes = round_trip(token(
            PosEncoding::Frequent(7),
            CostEncoding::Normal(0x1234),
            ValueEncoding::Normal(0x2a_bcde),
        ));
        assert_eq!(vec![0x40 | 0x2a, 7, 0x12, 0x34, 0xde, 0xbc], bytes);
    }

    #[test]
    fn test_full_pos_layout() {
        let bytes = round_trip(OnDiskToken {
            last: true,
            spelling_correction: true,
            pos: PosEncoding::Full {
                left_id: 0xabc,
                right_id: 0x123,
            },
            cost: CostEncoding::Small(0x7f00),
            value: ValueEncoding::Normal(0x01_0203),
        });
        assert_eq!(
            vec![0x80 | 0x10 | 0x04, 0xbc, 0x3a, 0x12, 0xff, 0x03, 0x02, 0x01],
            bytes
        );
    }

    #[test]
    fn test_small_cost_truncates() {
        let mut out = vec![];
        token(
            PosEncoding::SameAsPrev,
            CostEncoding::Small(0x1234),
            ValueEncoding::AsIsKatakana,
        )
        .encode(&mut out)
        .unwrap();
        assert_eq!(vec![0x0c | 0x02, 0x92], out);
        let (decoded, _) = OnDiskToken::decode(&out).unwrap();
        assert_eq!(CostEncoding::Small(0x1200), decoded.cost);
    }

    #[test]
    fn test_all_flag_combinations() {
        let positions = [
            PosEncoding::Frequent(255),
            PosEncoding::Full {
                left_id: 0xfff,
                right_id: 0,
            },
            PosEncoding::Mono(0x800),
            PosEncoding::SameAsPrev,
        ];
        let values = [
            ValueEncoding::Normal(0),
            ValueEncoding::Normal(VALUE_TRIE_ID_MAX),
            ValueEncoding::AsIsHiragana,
            ValueEncoding::AsIsKatakana,
            ValueEncoding::SameAsPrev,
        ];
        let costs = [CostEncoding::Normal(0x7fff), CostEncoding::Small(0x0100)];
        for pos in positions {
            for value in values {
                for cost in costs {
                    for last in [false, true] {
                        for spelling_correction in [false, true] {
                            round_trip(OnDiskToken {
                                last,
                                spelling_correction,
                                pos,
                                cost,
                                value,
                            });
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_cramming_avoids_termination_byte() {
        let t = OnDiskToken {
            last: true,
            ..token(
                PosEncoding::Frequent(0),
                CostEncoding::Normal(0),
                ValueEncoding::Normal(0x3f_0000),
            )
        };
        let bytes = round_trip(t);
        assert_ne!(TOKEN_TERMINATION, bytes[0]);
        assert_eq!(7, bytes.len());
    }

    #[test]
    fn test_out_of_range() {
        let invalid = [
            token(
                PosEncoding::Mono(0x1000),
                CostEncoding::Normal(0),
                ValueEncoding::AsIsHiragana,
            ),
            token(
                PosEncoding::Full {
                    left_id: 1,
                    right_id: 0x1000,
                },
                CostEncoding::Normal(0),
                ValueEncoding::AsIsHiragana,
            ),
            token(
                PosEncoding::Frequent(0),
                CostEncoding::Normal(0x8000),
                ValueEncoding::AsIsHiragana,
            ),
            token(
                PosEncoding::Mono(1),
                CostEncoding::Small(0x8000),
                ValueEncoding::Normal(1),
            ),
            token(
                PosEncoding::Frequent(0),
                CostEncoding::Normal(0),
                ValueEncoding::Normal(VALUE_TRIE_ID_MAX + 1),
            ),
        ];
        for t in invalid {
            let mut out = vec![0xaa];
            assert!(t.encode(&mut out).is_err());
            assert_eq!(vec![0xaa], out);
        }
    }

    #[test]
    fn test_decode_errors() {
        // reserved bit
        assert!(OnDiskToken::decode(&[0x20 | 0x01, 0, 0, 0]).is_err());
        // truncated
        assert!(OnDiskToken::decode(&[0x04, 1, 2]).is_err());
        assert!(OnDiskToken::decode(&[]).is_err());
        // mono id out of range
        assert!(OnDiskToken::decode(&[0x08 | 0x01, 0x00, 0x10, 0, 0]).is_err());
    }

    #[test]
    fn test_token_list() {
        let tokens = [
            token(
                PosEncoding::Mono(3),
                CostEncoding::Normal(500),
                ValueEncoding::AsIsHiragana,
            ),
            token(
                PosEncoding::SameAsPrev,
                CostEncoding::Normal(700),
                ValueEncoding::AsIsKatakana,
            ),
        ];
        let mut bytes = encode_token_list(&tokens).unwrap();
        // padding after the list is ignored
        bytes.extend_from_slice(&[0, 0, 0]);
        let decoded = decode_token_list(&bytes).unwrap();
        assert_eq!(2, decoded.len());
        assert!(!decoded[0].last);
        assert!(decoded[1].last);
        assert_eq!(PosEncoding::SameAsPrev, decoded[1].pos);
        assert_eq!(700, decoded[1].cost.cost());
    }

    #[test]
    fn test_token_list_errors() {
        let first_same = [token(
            PosEncoding::Frequent(0),
            CostEncoding::Normal(0),
            ValueEncoding::SameAsPrev,
        )];
        assert!(encode_token_list(&first_same).is_err());
        // same-as-prev pos on the first token
        assert!(decode_token_list(&[0x80 | 0x0c | 0x01, 0, 0]).is_err());
        // missing last flag
        assert!(decode_token_list(&[0x01, 0, 0, 0]).is_err());
        assert_eq!(0, decode_token_list(&[TOKEN_TERMINATION]).unwrap().len());
    }
}
