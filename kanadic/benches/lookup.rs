//! 乱数で生成した辞書を用いた検索と読み込みのベンチマーク
//!
//! 接頭辞検索、完全一致検索、コンテナを開く処理の速度を計測します。

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use kanadic::{SystemDictionary, SystemDictionaryBuilder, Token};

const HIRAGANA: &[char] = &[
    'あ', 'い', 'う', 'え', 'お', 'か', 'き', 'く', 'け', 'こ', 'さ', 'し', 'す', 'せ', 'そ', 'た',
    'ち', 'つ', 'て', 'と', 'な', 'に', 'ぬ', 'ね', 'の', 'ん', 'ょ', 'う',
];
const KANJI: &[char] = &['日', '本', '語', '変', '換', '辞', '書', '検', '索', '東', '京', '都'];

fn gen_string(rng: &mut ChaChaRng, chars: &[char], max_len: usize) -> String {
    let len = rng.gen_range(1..=max_len);
    (0..len).map(|_| *chars.choose(rng).unwrap()).collect()
}

fn gen_tokens(num: usize, seed: u64) -> Vec<Token> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    (0..num)
        .map(|_| {
            let key = gen_string(&mut rng, HIRAGANA, 6);
            let value = gen_string(&mut rng, KANJI, 3);
            let id = rng.gen_range(0..300);
            Token::new(key, value, rng.gen_range(0..0x7fff), id, id)
        })
        .collect()
}

fn criterion_lookup(c: &mut Criterion) {
    let mut builder = SystemDictionaryBuilder::new();
    builder.add_tokens(gen_tokens(100_000, 1));
    let bytes = builder.build().unwrap().to_bytes().unwrap();
    let dict = SystemDictionary::open(&bytes).unwrap();

    let mut rng = ChaChaRng::seed_from_u64(2);
    let queries: Vec<String> = (0..1000).map(|_| gen_string(&mut rng, HIRAGANA, 10)).collect();

    let mut group = c.benchmark_group("Lookup");
    group.throughput(Throughput::Elements(queries.len() as u64));
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    group.bench_function(BenchmarkId::new("ExactAndPrefixes", "Random"), |b| {
        b.iter(|| {
            let mut n = 0;
            for q in &queries {
                n += dict.lookup_exact_and_prefixes(q).unwrap().len();
            }
            n
        });
    });
    group.bench_function(BenchmarkId::new("Exact", "Random"), |b| {
        b.iter(|| {
            let mut n = 0;
            for q in &queries {
                n += dict.lookup_exact(q).unwrap().map_or(0, |e| e.tokens.len());
            }
            n
        });
    });
    group.finish();

    let mut group = c.benchmark_group("Open");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.sample_size(20);
    group.bench_function("SystemDictionary::open", |b| {
        b.iter(|| SystemDictionary::open(&bytes).unwrap().num_keys());
    });
    group.finish();
}

criterion_group!(benches, criterion_lookup);
criterion_main!(benches);
