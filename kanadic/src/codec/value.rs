//! 値(表記)文字列のコーデック
//!
//! 先頭バイトの値の範囲で後続バイト数が決まる可変長符号です。
//!
//! | 先頭バイト   | 内容                                   | 長さ |
//! |--------------|----------------------------------------|------|
//! | 0x01..=0x4a  | U+4E00..=U+97FF の漢字                 | 2    |
//! | 0x4b..=0x9e  | U+3041..=U+3094 のひらがな             | 1    |
//! | 0x9f..=0xfb  | U+30A1..=U+30FD のカタカナ             | 1    |
//! | 0xfc         | 上位バイトが0の文字                    | 2    |
//! | 0xfd         | 下位バイトが0の文字                    | 2    |
//! | 0xfe         | その他のBMPの文字                      | 3    |
//! | 0xff         | U+10000以上の文字                      | 2..4 |

use crate::errors::{KanadicError, Result};

const KANJI_FIRST: u32 = 0x4e00;
const KANJI_LAST: u32 = 0x97ff;
const HIRAGANA_FIRST: u32 = 0x3041;
const HIRAGANA_LAST: u32 = 0x3094;
const KATAKANA_FIRST: u32 = 0x30a1;
const KATAKANA_LAST: u32 = 0x30fd;

const HIRAGANA_BYTE: u8 = 0x4b;
const KATAKANA_BYTE: u8 = 0x9f;
const LOW_ONLY: u8 = 0xfc;
const HIGH_ONLY: u8 = 0xfd;
const BMP: u8 = 0xfe;
const UCS4: u8 = 0xff;

const UCS4_NO_MIDDLE: u8 = 0x80;
const UCS4_NO_RIGHT: u8 = 0x40;
const UCS4_LEFT_MASK: u8 = 0x1f;

/// 値を符号化する
pub fn encode_value(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for c in value.chars() {
        encode_char(c, &mut out);
    }
    out
}

fn encode_char(c: char, out: &mut Vec<u8>) {
    let cp = u32::from(c);
    let hi = ((cp >> 8) & 0xff) as u8;
    let lo = (cp & 0xff) as u8;
    match cp {
        HIRAGANA_FIRST..=HIRAGANA_LAST => out.push((cp - HIRAGANA_FIRST) as u8 + HIRAGANA_BYTE),
        KATAKANA_FIRST..=KATAKANA_LAST => out.push((cp - KATAKANA_FIRST) as u8 + KATAKANA_BYTE),
        0..=0xffff if hi == 0 => out.extend_from_slice(&[LOW_ONLY, lo]),
        0..=0xffff if lo == 0 => out.extend_from_slice(&[HIGH_ONLY, hi]),
        KANJI_FIRST..=KANJI_LAST => {
            out.extend_from_slice(&[(((cp - KANJI_FIRST) >> 8) + 1) as u8, lo]);
        }
        0..=0xffff => out.extend_from_slice(&[BMP, hi, lo]),
        _ => {
            let left = (cp >> 16) as u8;
            let mut flags = 0;
            if hi == 0 {
                flags |= UCS4_NO_MIDDLE;
            }
            if lo == 0 {
                flags |= UCS4_NO_RIGHT;
            }
            out.push(UCS4);
            out.push(left | flags);
            if hi != 0 {
                out.push(hi);
            }
            if lo != 0 {
                out.push(lo);
            }
        }
    }
}

/// 符号化された値を復号する
///
/// # エラー
///
/// 先頭バイトが0の場合、後続バイトが足りない場合、または復号した値が
/// Unicodeのスカラー値でない場合にエラーを返します。
pub fn decode_value(bytes: &[u8]) -> Result<String> {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    while let Some((&b0, tail)) = rest.split_first() {
        let (cp, used) = match b0 {
            0 => return Err(KanadicError::invalid_format("value", "unexpected 0x00")),
            0x01..=0x4a => {
                let lo = *tail.first().ok_or_else(truncated)?;
                (KANJI_FIRST + (u32::from(b0 - 1) << 8) + u32::from(lo), 1)
            }
            HIRAGANA_BYTE..=0x9e => (u32::from(b0 - HIRAGANA_BYTE) + HIRAGANA_FIRST, 0),
            KATAKANA_BYTE..=0xfb => (u32::from(b0 - KATAKANA_BYTE) + KATAKANA_FIRST, 0),
            LOW_ONLY => (u32::from(*tail.first().ok_or_else(truncated)?), 1),
            HIGH_ONLY => (u32::from(*tail.first().ok_or_else(truncated)?) << 8, 1),
            BMP => {
                let b = tail.get(..2).ok_or_else(truncated)?;
                ((u32::from(b[0]) << 8) | u32::from(b[1]), 2)
            }
            UCS4 => {
                let head = *tail.first().ok_or_else(truncated)?;
                let mut cp = u32::from(head & UCS4_LEFT_MASK) << 16;
                let mut used = 1;
                if head & UCS4_NO_MIDDLE == 0 {
                    cp |= u32::from(*tail.get(used).ok_or_else(truncated)?) << 8;
                    used += 1;
                }
                if head & UCS4_NO_RIGHT == 0 {
                    cp |= u32::from(*tail.get(used).ok_or_else(truncated)?);
                    used += 1;
                }
                (cp, used)
            }
        };
        let c = char::from_u32(cp).ok_or_else(|| {
            KanadicError::invalid_format("value", format!("invalid code point {cp:#x}"))
        })?;
        out.push(c);
        rest = &tail[used..];
    }
    Ok(out)
}

fn truncated() -> KanadicError {
    KanadicError::invalid_format("value", "truncated character")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_kana() {
        assert_eq!(vec![0x4b], encode_value("ぁ"));
        assert_eq!(vec![0x9e], encode_value("ゔ"));
        assert_eq!(vec![0x9f], encode_value("ァ"));
        assert_eq!(vec![0xfb], encode_value("ヽ"));
    }

    #[test]
    fn test_kanji() {
        assert_eq!(vec![0x01, 0x01], encode_value("丁"));
        // 猫 = U+732B
        assert_eq!(vec![0x26, 0x2b], encode_value("猫"));
        assert_eq!(vec![0x4a, 0xff], encode_value("\u{97ff}"));
        assert_eq!(vec![BMP, 0x98, 0x01], encode_value("\u{9801}"));
    }

    #[test]
    fn test_zero_bytes_are_omitted() {
        assert_eq!(vec![LOW_ONLY, b'A'], encode_value("A"));
        assert_eq!(vec![HIGH_ONLY, 0x4f], encode_value("\u{4f00}"));
        // ゕ = U+3095 is not in the single byte range.
        assert_eq!(vec![BMP, 0x30, 0x95], encode_value("ゕ"));
    }

    #[test]
    fn test_supplementary() {
        assert_eq!(vec![UCS4, 0x01, 0xf3, 0x63], encode_value("🍣"));
        assert_eq!(vec![UCS4, 0x02 | UCS4_NO_RIGHT, 0x0b], encode_value("\u{20b00}"));
        assert_eq!(vec![UCS4, 0x02 | UCS4_NO_MIDDLE, 0x9f], encode_value("\u{2009f}"));
        assert_eq!(
            vec![UCS4, 0x10 | UCS4_NO_MIDDLE | UCS4_NO_RIGHT],
            encode_value("\u{100000}")
        );
    }

    #[test]
    fn test_round_trip() {
        for value in [
            "ねこ",
            "ネコ",
            "猫",
            "東京都",
            "Rust 1.74",
            "𠮷野家",
            "🍣と\u{20000}と\u{100000}",
            "ゕゖヷヺ・ー",
            "",
        ] {
            assert_eq!(value, decode_value(&encode_value(value)).unwrap());
        }
    }

    #[test]
    fn test_decode_errors() {
        assert!(decode_value(&[0x00]).is_err());
        assert!(decode_value(&[0x01]).is_err());
        assert!(decode_value(&[BMP, 0x30]).is_err());
        assert!(decode_value(&[UCS4, 0x01, 0xf3]).is_err());
        // surrogate
        assert!(decode_value(&[BMP, 0xd8, 0x01]).is_err());
    }
}
