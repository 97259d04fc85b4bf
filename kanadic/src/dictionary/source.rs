//! 辞書ソース(タブ区切りテキスト)の読み込み
//!
//! 1行は`読み, 左ID, 右ID, コスト, 表記[, ラベル]`の5〜6フィールドです。

use std::io::BufRead;

use crate::errors::{KanadicError, Result};
use crate::kana::ScriptConverter;
use crate::token::{Token, TokenAttribute};
use crate::utils::parse_tsv_row;

const LABEL_SPELLING_CORRECTION: &str = "SPELLING_CORRECTION";
const LABEL_ZIP_CODE: &str = "ZIP_CODE";
const LABEL_ENGLISH: &str = "ENGLISH";

/// 1行をトークンに変換する
///
/// 空行には`None`を返します。
///
/// # 引数
///
/// * `row` - 改行を含まない1行
/// * `source` - エラーメッセージに使う入力元の名前
/// * `line` - 1始まりの行番号
/// * `converter` - 読みと表記の正規化に使う変換器
///
/// # エラー
///
/// フィールド数が不正な場合、数値が解析できない場合、読みが空かU+0000を含む場合、
/// または未対応のラベルが付いている場合に[`KanadicError::InvalidInputRow`]を返します。
pub fn parse_row(
    row: &str,
    source: &str,
    line: usize,
    converter: &dyn ScriptConverter,
) -> Result<Option<Token>> {
    let row = row.trim_end_matches('\r');
    if row.is_empty() {
        return Ok(None);
    }
    let fields = parse_tsv_row(row).map_err(|e| KanadicError::invalid_row(source, line, e.to_string()))?;
    if !(5..=6).contains(&fields.len()) {
        return Err(KanadicError::invalid_row(
            source,
            line,
            format!("expected 5 or 6 fields, got {}", fields.len()),
        ));
    }

    let number = |i: usize, name: &str| -> Result<u16> {
        fields[i].parse().map_err(|e| {
            KanadicError::invalid_row(source, line, format!("{name} '{}': {e}", fields[i]))
        })
    };
    let left_id = number(1, "left id")?;
    let right_id = number(2, "right id")?;
    let cost = number(3, "cost")?;

    let key = converter.normalize_voiced_sound_mark(&fields[0]);
    let value = converter.normalize_voiced_sound_mark(&fields[4]);
    if key.is_empty() {
        return Err(KanadicError::invalid_row(source, line, "empty key"));
    }
    if key.contains('\0') {
        return Err(KanadicError::invalid_row(source, line, "key contains U+0000"));
    }

    let label = fields.get(5).map_or("", String::as_str);
    let attribute = if label.is_empty() {
        TokenAttribute::NONE
    } else if label.starts_with(LABEL_SPELLING_CORRECTION) {
        TokenAttribute::SPELLING_CORRECTION
    } else if label.starts_with(LABEL_ZIP_CODE) || label.starts_with(LABEL_ENGLISH) {
        return Err(KanadicError::invalid_row(
            source,
            line,
            format!("label '{label}' requires grammar ids that are not available"),
        ));
    } else {
        return Err(KanadicError::invalid_row(
            source,
            line,
            format!("unknown label '{label}'"),
        ));
    };

    Ok(Some(
        Token::new(key, value, cost, left_id, right_id).with_attribute(attribute),
    ))
}

/// 入力全体をトークン列に変換する
///
/// # エラー
///
/// 最初に失敗した行のエラーを返し、それ以降は読みません。
pub fn read_tokens<R>(rdr: R, source: &str, converter: &dyn ScriptConverter) -> Result<Vec<Token>>
where
    R: BufRead,
{
    let mut tokens = vec![];
    for (i, line) in rdr.lines().enumerate() {
        let line = line?;
        match parse_row(&line, source, i + 1, converter)? {
            Some(token) => tokens.push(token),
            None => log::warn!("{source}:{}: skipped an empty line", i + 1),
        }
    }
    Ok(tokens)
}
