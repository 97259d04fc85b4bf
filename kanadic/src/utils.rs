//! ユーティリティ関数と型変換トレイトを提供するモジュール
//!
//! - `FromU32`: u32からの型変換トレイト
//! - タブ区切り行の解析
//! - リトルエンディアン整数の読み書き

use csv_core::ReadFieldResult;

use crate::errors::{KanadicError, Result};

/// u32から他の型への変換を提供するトレイト
pub trait FromU32 {
    /// u32値から実装型を生成する
    fn from_u32(src: u32) -> Self;
}

#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
impl FromU32 for usize {
    #[inline(always)]
    fn from_u32(src: u32) -> Self {
        // Since the pointer width is guaranteed to be 32 or 64,
        // the following process always succeeds.
        unsafe { Self::try_from(src).unwrap_unchecked() }
    }
}

/// タブ区切りの行をフィールドに分割する
///
/// 引用符は解釈せず、フィールド中のダブルクォートはそのまま残ります。
/// 辞書ソースの見出し語には記号がそのまま現れるためです。
///
/// # 例
///
/// ```
/// # use kanadic::utils::parse_tsv_row;
/// let fields = parse_tsv_row("ねこ\t10\t20\t500\t猫").unwrap();
/// assert_eq!(fields, vec!["ねこ", "10", "20", "500", "猫"]);
/// ```
///
/// # エラー
///
/// フィールドが有効なUTF-8でない場合にエラーを返します。
pub fn parse_tsv_row(row: &str) -> Result<Vec<String>> {
    let mut fields = vec![];
    let mut rdr = csv_core::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .build();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    let mut field = vec![];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        bytes = &bytes[nin..];
        field.extend_from_slice(&output[..nout]);
        match result {
            // An empty input on the next call signals the end of the row.
            ReadFieldResult::InputEmpty | ReadFieldResult::OutputFull => continue,
            ReadFieldResult::Field { record_end } => {
                fields.push(String::from_utf8(std::mem::take(&mut field))
                    .map_err(|e| e.utf8_error())?);
                if record_end {
                    break;
                }
            }
            ReadFieldResult::End => break,
        }
    }
    Ok(fields)
}

/// `offset`から始まるリトルエンディアンの`u32`を読む
///
/// 範囲外の場合は`None`を返します。
#[inline(always)]
pub(crate) fn read_u32_le(bytes: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let b = bytes.get(offset..end)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// ヘッダとして読む`i32`を`usize`に変換する
///
/// 負の値は破損とみなします。
pub(crate) fn read_len_le(bytes: &[u8], offset: usize, section: &'static str) -> Result<usize> {
    let raw = read_u32_le(bytes, offset)
        .ok_or_else(|| KanadicError::malformed(section, "truncated header"))?;
    let len = i32::from_le_bytes(raw.to_le_bytes());
    usize::try_from(len)
        .map_err(|_| KanadicError::malformed(section, format!("negative length {len}")))
}

/// `usize`を`i32`のリトルエンディアンとして書き出す
pub(crate) fn push_len_le(out: &mut Vec<u8>, len: usize, field: &'static str) -> Result<()> {
    let len = i32::try_from(len)
        .map_err(|_| KanadicError::out_of_range(field, len as u64, i32::MAX as u64))?;
    out.extend_from_slice(&len.to_le_bytes());
    Ok(())
}
