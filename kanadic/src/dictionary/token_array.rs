//! 可変長レコード配列
//!
//! 密なIDから可変長のバイト列を引きます。長さの表は持たず、レコードごとに
//! 「開始を表す0ビット1つと、追加チャンクの数だけの1ビット」を並べたビット列と
//! rank/select索引からオフセットと長さを求めます。
//!
//! イメージの形式は、リトルエンディアンの32ビット整数4つ(索引のバイト長、基本長、
//! 追加チャンク長、予約領域0)に続いて、索引ビット列とデータを並べたものです。

use crate::dictionary::config::{BitVectorCacheConfig, TokenArrayConfig};
use crate::errors::{KanadicError, Result};
use crate::succinct::{BitStream, SuccinctBitVectorIndex};
use crate::utils::{push_len_le, read_len_le};

const HEADER_LEN: usize = 16;

/// ビットベクトルで位置を引く可変長レコード配列
#[derive(Clone, Debug)]
pub struct BitVectorBasedArray<'a> {
    index: SuccinctBitVectorIndex<'a>,
    data: &'a [u8],
    base_length: usize,
    step_length: usize,
    len: usize,
}

impl<'a> BitVectorBasedArray<'a> {
    /// イメージから配列を構築します。
    pub fn new(image: &'a [u8]) -> Result<Self> {
        let index_len = read_len_le(image, 0, "token array")?;
        let base_length = read_len_le(image, 4, "token array")?;
        let step_length = read_len_le(image, 8, "token array")?;
        let reserved = read_len_le(image, 12, "token array")?;
        if reserved != 0 {
            return Err(KanadicError::malformed(
                "token array",
                format!("reserved header field is {reserved}"),
            ));
        }
        if base_length == 0 || step_length == 0 {
            return Err(KanadicError::malformed(
                "token array",
                "chunk lengths must be positive",
            ));
        }
        let body = image.get(HEADER_LEN..).unwrap_or_default();
        if body.len() < index_len {
            return Err(KanadicError::malformed(
                "token array",
                format!("index needs {index_len} bytes, got {}", body.len()),
            ));
        }
        let (index_bytes, data) = body.split_at(index_len);
        let index = SuccinctBitVectorIndex::new(index_bytes, BitVectorCacheConfig::TOKEN_ARRAY)?;

        let step_bytes = step_length * index.num_ones();
        let len = data
            .len()
            .checked_sub(step_bytes)
            .filter(|base_bytes| base_bytes % base_length == 0)
            .map(|base_bytes| base_bytes / base_length)
            .ok_or_else(|| {
                KanadicError::malformed(
                    "token array",
                    format!("data length {} does not match the index", data.len()),
                )
            })?;
        if index.num_zeros() < len + 1 {
            return Err(KanadicError::malformed(
                "token array",
                "index has fewer records than the data",
            ));
        }

        Ok(Self {
            index,
            data,
            base_length,
            step_length,
            len,
        })
    }

    /// レコード数
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// ID番目のレコードを、チャンク境界まで詰め物をした状態で返します。
    pub fn get(&self, id: usize) -> Option<&'a [u8]> {
        if id >= self.len {
            return None;
        }
        let start = self.index.select0(id + 1);
        let next = self.index.select0(id + 2);
        let steps = next - start - 1;
        let offset = self.base_length * id + self.step_length * self.index.rank1(start);
        let length = self.base_length + self.step_length * steps;
        self.data.get(offset..offset + length)
    }
}

/// [`BitVectorBasedArray`]のイメージを構築するビルダー
pub struct BitVectorBasedArrayBuilder {
    config: TokenArrayConfig,
    index: BitStream,
    data: Vec<u8>,
}

impl BitVectorBasedArrayBuilder {
    /// # エラー
    ///
    /// チャンク長が0の場合、[`KanadicError::InvalidArgument`]を返します。
    pub fn new(config: TokenArrayConfig) -> Result<Self> {
        if config.base_length == 0 || config.step_length == 0 {
            return Err(KanadicError::invalid_argument(
                "config",
                "base_length and step_length must be positive",
            ));
        }
        Ok(Self {
            config,
            index: BitStream::new(),
            data: vec![],
        })
    }

    /// レコードを追加します。IDは追加順に0から振られます。
    pub fn push(&mut self, record: &[u8]) {
        let TokenArrayConfig {
            base_length,
            step_length,
        } = self.config;
        let steps = record.len().saturating_sub(base_length).div_ceil(step_length);
        self.index.push(false);
        self.index.push_repeated(true, steps);
        self.data.extend_from_slice(record);
        let padded = base_length + step_length * steps;
        self.data.resize(self.data.len() + padded - record.len(), 0);
    }

    /// イメージを構築します。
    pub fn build(mut self) -> Result<Vec<u8>> {
        self.index.push(false);
        let index = self.index.into_bytes();
        let mut image = Vec::with_capacity(HEADER_LEN + index.len() + self.data.len());
        push_len_le(&mut image, index.len(), "index length")?;
        push_len_le(&mut image, self.config.base_length, "base length")?;
        push_len_le(&mut image, self.config.step_length, "step length")?;
        push_len_le(&mut image, 0, "reserved")?;
        image.extend_from_slice(&index);
        image.extend_from_slice(&self.data);
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(config: TokenArrayConfig, records: &[&[u8]]) -> Vec<u8> {
        let mut builder = BitVectorBasedArrayBuilder::new(config).unwrap();
        for r in records {
            builder.push(r);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_get() {
        let records: &[&[u8]] = &[b"ab", b"abcd", b"abcdefg", b"", b"abcde", b"\xff"];
        let image = build(TokenArrayConfig::default(), records);
        let array = BitVectorBasedArray::new(&image).unwrap();
        assert_eq!(records.len(), array.len());
        assert_eq!(Some(&b"ab\0\0"[..]), array.get(0));
        assert_eq!(Some(&b"abcd"[..]), array.get(1));
        assert_eq!(Some(&b"abcdefg"[..]), array.get(2));
        assert_eq!(Some(&b"\0\0\0\0"[..]), array.get(3));
        assert_eq!(Some(&b"abcde"[..]), array.get(4));
        assert_eq!(Some(&b"\xff\0\0\0"[..]), array.get(5));
        assert_eq!(None, array.get(6));
    }

    #[test]
    fn test_wide_steps() {
        let config = TokenArrayConfig {
            base_length: 2,
            step_length: 3,
        };
        let records: &[&[u8]] = &[b"abcdef", b"a", b"abc"];
        let image = build(config, records);
        let array = BitVectorBasedArray::new(&image).unwrap();
        assert_eq!(Some(&b"abcdef\0\0"[..]), array.get(0));
        assert_eq!(Some(&b"a\0"[..]), array.get(1));
        assert_eq!(Some(&b"abc\0\0"[..]), array.get(2));
    }

    #[test]
    fn test_many_records() {
        let records: Vec<Vec<u8>> = (0..1000).map(|i| vec![(i % 251) as u8; i % 13]).collect();
        let refs: Vec<&[u8]> = records.iter().map(Vec::as_slice).collect();
        let image = build(TokenArrayConfig::default(), &refs);
        let array = BitVectorBasedArray::new(&image).unwrap();
        for (i, r) in records.iter().enumerate() {
            let got = array.get(i).unwrap();
            assert_eq!(&r[..], &got[..r.len()]);
            assert!(got[r.len()..].iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_empty() {
        let image = build(TokenArrayConfig::default(), &[]);
        let array = BitVectorBasedArray::new(&image).unwrap();
        assert!(array.is_empty());
        assert_eq!(None, array.get(0));
    }

    #[test]
    fn test_malformed() {
        let mut image = build(TokenArrayConfig::default(), &[&b"abc"[..]]);
        image[12] = 1;
        assert!(BitVectorBasedArray::new(&image).is_err());

        let mut image = build(TokenArrayConfig::default(), &[&b"abc"[..]]);
        image.push(0);
        assert!(BitVectorBasedArray::new(&image).is_err());

        assert!(BitVectorBasedArrayBuilder::new(TokenArrayConfig {
            base_length: 0,
            step_length: 1
        })
        .is_err());
    }
}
