//! キー文字列のコーデック
//!
//! 読みに頻出するひらがなと長音記号を制御文字・ASCIIの範囲と入れ替え、
//! トライの辺ラベルで1バイトに収まるようにします。入れ替えは対合なので、
//! 符号化と復号は同じ写像です。U+0000は符号化で取り除かれます。

use crate::errors::Result;

/// 1文字の入れ替え
#[inline(always)]
fn swap(c: char) -> char {
    let cp = u32::from(c);
    let mapped = match cp {
        0x0001..=0x001f => cp - 0x0001 + 0x3041,
        0x3041..=0x305f => cp - 0x3041 + 0x0001,
        0x0040..=0x0075 => cp - 0x0040 + 0x3060,
        0x3060..=0x3095 => cp - 0x3060 + 0x0040,
        0x0076..=0x0077 => cp - 0x0076 + 0x30fb,
        0x30fb..=0x30fc => cp - 0x30fb + 0x0076,
        _ => return c,
    };
    // Every mapped code point is a scalar value outside the surrogate range.
    char::from_u32(mapped).unwrap_or(c)
}

/// キーをトライ用のバイト列に符号化する
///
/// ```
/// # use kanadic::codec::key::encode_key;
/// assert_eq!(vec![0x4d, 0x13], encode_key("ねこ"));
/// ```
pub fn encode_key(key: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(key.len());
    let mut buf = [0; 4];
    for c in key.chars().filter(|&c| c != '\0') {
        out.extend_from_slice(swap(c).encode_utf8(&mut buf).as_bytes());
    }
    out
}

/// 符号化されたキーを復号する
///
/// # エラー
///
/// 入力が有効なUTF-8でない場合にエラーを返します。
pub fn decode_key(bytes: &[u8]) -> Result<String> {
    Ok(std::str::from_utf8(bytes)?.chars().map(swap).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hiragana_becomes_single_byte() {
        assert_eq!(vec![0x01], encode_key("ぁ"));
        assert_eq!(vec![0x1f], encode_key("た"));
        assert_eq!(vec![0x40], encode_key("だ"));
        assert_eq!(vec![0x75], encode_key("ゕ"));
        assert_eq!(vec![0x76, 0x77], encode_key("・ー"));
    }

    #[test]
    fn test_ascii_digits_stay() {
        assert_eq!(b"2024-".to_vec(), encode_key("2024-"));
    }

    #[test]
    fn test_swapped_ascii_is_multibyte() {
        let encoded = encode_key("A");
        assert_eq!("\u{3061}".as_bytes(), encoded.as_slice());
        assert_eq!("A", decode_key(&encoded).unwrap());
    }

    #[test]
    fn test_round_trip() {
        for key in ["ねこ", "きょうと", "ゔぁいおりん", "らーめん", "abcXYZ~", "漢字かな", "🍣すし"] {
            assert_eq!(key, decode_key(&encode_key(key)).unwrap());
        }
    }

    #[test]
    fn test_nul_is_dropped() {
        assert_eq!(encode_key("ねこ"), encode_key("ね\0こ"));
        assert!(!encode_key("\0ね\0").contains(&0));
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(decode_key(&[0xe3, 0x81]).is_err());
    }
}
