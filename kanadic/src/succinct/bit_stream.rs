//! ビルダー用のビット列ライター

/// 最下位ビットから順にビットを詰めていくライター
///
/// [`SuccinctBitVectorIndex`](super::bit_vector::SuccinctBitVectorIndex)と同じビット順で
/// 書き込みます。
#[derive(Clone, Debug, Default)]
pub struct BitStream {
    bytes: Vec<u8>,
    len: usize,
}

impl BitStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// 書き込んだビット数
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << (self.len % 8);
        }
        self.len += 1;
    }

    /// 同じビットを`n`個書き込む
    pub fn push_repeated(&mut self, bit: bool, n: usize) {
        for _ in 0..n {
            self.push(bit);
        }
    }

    /// 32ビット境界まで0を書き込む
    pub fn pad_to_32(&mut self) {
        while self.len % 32 != 0 {
            self.push(false);
        }
    }

    /// 32ビット境界まで詰めたバイト列を返す
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.pad_to_32();
        self.bytes
    }
}
