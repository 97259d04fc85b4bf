use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use crate::dictionary::config::BitVectorCacheConfig;
use crate::succinct::{BitStream, SuccinctBitVectorIndex};

fn gen_random_bytes(len: usize, density: f64, seed: u64) -> Vec<u8> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    let mut stream = BitStream::new();
    for _ in 0..len {
        stream.push(rng.gen_bool(density));
    }
    stream.into_bytes()
}

fn bits_of(bytes: &[u8]) -> Vec<bool> {
    (0..bytes.len() * 8)
        .map(|i| (bytes[i / 8] >> (i % 8)) & 1 == 1)
        .collect()
}

fn test_rank_select(bytes: &[u8], config: BitVectorCacheConfig) {
    let bits = bits_of(bytes);
    let bv = SuccinctBitVectorIndex::new(bytes, config).unwrap();
    assert_eq!(bits.len(), bv.len());

    let mut ones = 0;
    for (i, &b) in bits.iter().enumerate() {
        assert_eq!(ones, bv.rank1(i));
        assert_eq!(i - ones, bv.rank0(i));
        assert_eq!(b, bv.get(i));
        if b {
            ones += 1;
        }
    }
    assert_eq!(ones, bv.num_ones());
    assert_eq!(bits.len() - ones, bv.num_zeros());

    for n in 1..=bv.num_ones() {
        let pos = bv.select1(n);
        assert!(bv.get(pos));
        assert_eq!(n, bv.rank1(pos + 1));
    }
    for n in 1..=bv.num_zeros() {
        let pos = bv.select0(n);
        assert!(!bv.get(pos));
        assert_eq!(n, bv.rank0(pos + 1));
    }
}

#[test]
fn test_random_dense() {
    let bytes = gen_random_bytes(10_000, 0.9, 13);
    test_rank_select(&bytes, BitVectorCacheConfig::default());
    test_rank_select(&bytes, BitVectorCacheConfig::NONE);
}

#[test]
fn test_random_sparse() {
    let bytes = gen_random_bytes(10_000, 0.05, 17);
    test_rank_select(&bytes, BitVectorCacheConfig::default());
    test_rank_select(&bytes, BitVectorCacheConfig::TOKEN_ARRAY);
}

#[test]
fn test_small_caches() {
    let bytes = gen_random_bytes(5_000, 0.5, 19);
    let config = BitVectorCacheConfig {
        lb0_cache_size: 7,
        lb1_cache_size: 3,
    };
    test_rank_select(&bytes, config);
}

#[test]
fn test_all_zeros_and_ones() {
    let mut zeros = BitStream::new();
    zeros.push_repeated(false, 300);
    test_rank_select(&zeros.into_bytes(), BitVectorCacheConfig::default());

    let mut ones = BitStream::new();
    ones.push_repeated(true, 320);
    test_rank_select(&ones.into_bytes(), BitVectorCacheConfig::default());
}
