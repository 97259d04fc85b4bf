//! 文字種変換
//!
//! 辞書ビルダーとリーダーは、ひらがなからカタカナへの変換と濁点の正規化を
//! [`ScriptConverter`]経由で行います。グローバルな変換テーブルは持たず、
//! 変換器は構築時に注入されます。

/// 文字種変換器
///
/// 実装は読み取り専用で、複数スレッドから同時に呼ばれても安全である必要があります。
pub trait ScriptConverter: Send + Sync {
    /// ひらがなをカタカナに変換する
    ///
    /// ひらがな以外の文字はそのまま残します。
    fn hiragana_to_katakana(&self, s: &str) -> String;

    /// 濁点・半濁点の表記ゆれを正規化する
    ///
    /// デフォルト実装は入力をそのまま返します。
    fn normalize_voiced_sound_mark(&self, s: &str) -> String {
        s.to_string()
    }
}

/// コードポイントの差分だけで変換するデフォルトの変換器
///
/// U+3041(ぁ)からU+3096(ゖ)までを0x60だけずらしてカタカナにします。
/// 濁点・半濁点(結合文字U+3099/U+309Aと独立した記号U+309B/U+309C)は、
/// 直前の仮名と合成できる場合に1文字にまとめます。
#[derive(Clone, Copy, Debug, Default)]
pub struct KanaConverter;

const HIRAGANA_FIRST: u32 = 0x3041;
const HIRAGANA_LAST: u32 = 0x3096;
const KATAKANA_FIRST: u32 = 0x30a1;
const KATAKANA_LAST: u32 = 0x30f6;
const KATAKANA_OFFSET: u32 = 0x60;

const COMBINING_VOICED: char = '\u{3099}';
const COMBINING_SEMI_VOICED: char = '\u{309a}';
const VOICED: char = '\u{309b}';
const SEMI_VOICED: char = '\u{309c}';

/// カタカナならひらがなに戻した値と、戻したずれ幅
#[inline(always)]
fn to_hiragana_base(cp: u32) -> (u32, u32) {
    if (KATAKANA_FIRST..=KATAKANA_LAST).contains(&cp) {
        (cp - KATAKANA_OFFSET, KATAKANA_OFFSET)
    } else {
        (cp, 0)
    }
}

/// 濁音にした文字
fn voiced(c: char) -> Option<char> {
    let cp = u32::from(c);
    let (base, shift) = to_hiragana_base(cp);
    let mapped = match base {
        // か..ち
        0x304b..=0x3062 if (base - 0x304b) % 2 == 0 => base + 1 + shift,
        // つ, て, と
        0x3064 | 0x3066 | 0x3068 => base + 1 + shift,
        // は..ほ
        0x306f..=0x307b if (base - 0x306f) % 3 == 0 => base + 1 + shift,
        // う
        0x3046 => 0x3094 + shift,
        _ => match cp {
            // ワ..ヲ
            0x30ef..=0x30f2 => cp + 8,
            // ゝ, ヽ
            0x309d | 0x30fd => cp + 1,
            _ => return None,
        },
    };
    char::from_u32(mapped)
}

/// 半濁音にした文字
fn semi_voiced(c: char) -> Option<char> {
    let (base, shift) = to_hiragana_base(u32::from(c));
    match base {
        0x306f..=0x307b if (base - 0x306f) % 3 == 0 => char::from_u32(base + 2 + shift),
        _ => None,
    }
}

impl ScriptConverter for KanaConverter {
    fn hiragana_to_katakana(&self, s: &str) -> String {
        s.chars()
            .map(|c| {
                let cp = u32::from(c);
                if (HIRAGANA_FIRST..=HIRAGANA_LAST).contains(&cp) {
                    char::from_u32(cp + KATAKANA_OFFSET).unwrap_or(c)
                } else {
                    c
                }
            })
            .collect()
    }

    fn normalize_voiced_sound_mark(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            let composed = match chars.peek() {
                Some(&(COMBINING_VOICED | VOICED)) => voiced(c),
                Some(&(COMBINING_SEMI_VOICED | SEMI_VOICED)) => semi_voiced(c),
                _ => None,
            };
            match composed {
                Some(composed) => {
                    out.push(composed);
                    chars.next();
                }
                None => out.push(c),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hiragana_to_katakana() {
        let conv = KanaConverter;
        assert_eq!("ネコ", conv.hiragana_to_katakana("ねこ"));
        assert_eq!("ヴァイオリン", conv.hiragana_to_katakana("ゔぁいおりん"));
        assert_eq!("ネコ猫ー", conv.hiragana_to_katakana("ねこ猫ー"));
        assert_eq!("ABC", conv.hiragana_to_katakana("ABC"));
    }

    #[test]
    fn test_normalize_voiced_sound_mark() {
        let conv = KanaConverter;
        assert_eq!("が", conv.normalize_voiced_sound_mark("か\u{3099}"));
        assert_eq!("が", conv.normalize_voiced_sound_mark("か\u{309b}"));
        assert_eq!("ぱぴぷぺぽ", conv.normalize_voiced_sound_mark("は゜ひ゜ふ゜へ゜ほ゜"));
        assert_eq!("ばづでど", conv.normalize_voiced_sound_mark("は゛つ゛て゛と゛"));
        assert_eq!("ゔヴヷヺヾ", conv.normalize_voiced_sound_mark("う゛ウ゛ワ゛ヲ゛ヽ゛"));
        assert_eq!("ガギグゲゴダヂ", conv.normalize_voiced_sound_mark("カ゛キ゛ク゛ケ゛コ゛タ゛チ゛"));
        assert_eq!("パ", conv.normalize_voiced_sound_mark("ハ\u{309a}"));
    }

    #[test]
    fn test_normalize_keeps_marks_that_cannot_compose() {
        let conv = KanaConverter;
        assert_eq!("あ゛", conv.normalize_voiced_sound_mark("あ゛"));
        assert_eq!("か゜", conv.normalize_voiced_sound_mark("か゜"));
        assert_eq!("゛か", conv.normalize_voiced_sound_mark("゛か"));
        assert_eq!("っ゛", conv.normalize_voiced_sound_mark("っ゛"));
        assert_eq!("ねこ", conv.normalize_voiced_sound_mark("ねこ"));
    }
}
