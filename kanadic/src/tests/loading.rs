//! ファイルからの読み込みに関するテスト

use std::fs;
use std::io::Write;

use tempfile::{tempdir, NamedTempFile};

use crate::dictionary::{DictionaryFile, SystemDictionaryBuilder};
use crate::errors::KanadicError;
use crate::token::Token;

fn sample_bytes() -> Vec<u8> {
    let mut builder = SystemDictionaryBuilder::new();
    builder.add_tokens([
        Token::new("ねこ", "猫", 500, 10, 20),
        Token::new("ねこ", "ネコ", 700, 10, 20),
        Token::new("ね", "根", 800, 3, 3),
    ]);
    builder.build().unwrap().to_bytes().unwrap()
}

#[test]
fn test_from_path() {
    let bytes = sample_bytes();
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let dict_file = DictionaryFile::from_path(file.path()).unwrap();
    assert_eq!(bytes.as_slice(), dict_file.as_bytes());
    let dict = dict_file.open().unwrap();
    let entries = dict.lookup_exact_and_prefixes("ねこ").unwrap();
    assert_eq!(2, entries.len());
    assert_eq!(2, entries[1].tokens.len());
}

#[test]
fn test_from_zstd() {
    let bytes = sample_bytes();
    let compressed = zstd::encode_all(bytes.as_slice(), 19).unwrap();

    let dict_file = DictionaryFile::from_zstd_reader(compressed.as_slice()).unwrap();
    assert_eq!(bytes.as_slice(), dict_file.as_bytes());

    let dir = tempdir().unwrap();
    let path = dir.path().join("system.dic.zst");
    fs::write(&path, &compressed).unwrap();
    let dict_file = DictionaryFile::from_zstd(&path).unwrap();
    let dict = dict_file.open().unwrap();
    assert_eq!(2, dict.num_keys());
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let result = DictionaryFile::from_path(dir.path().join("missing.dic"));
    assert!(matches!(result, Err(KanadicError::InvalidArgument(_))));
}

#[test]
fn test_corrupted_file() {
    let mut bytes = sample_bytes();
    bytes[0] ^= 0xff;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();
    let result = DictionaryFile::from_path(file.path());
    assert!(matches!(result, Err(KanadicError::MalformedContainer(_))));
}

#[test]
fn test_add_sources() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.tsv");
    let b = dir.path().join("b.tsv");
    fs::write(&a, "ねこ\t10\t20\t500\t猫\nねこ\t10\t20\t700\tネコ\n").unwrap();
    fs::write(&b, "いぬ\t1\t1\t300\t犬\r\n\nね\t3\t3\t800\t根\tSPELLING_CORRECTION\n").unwrap();

    let mut builder = SystemDictionaryBuilder::new();
    builder.add_sources(&[&a, &b]).unwrap();
    assert_eq!(4, builder.num_tokens());

    let bytes = builder.build().unwrap().to_bytes().unwrap();
    let dict_file = DictionaryFile::read(bytes.as_slice()).unwrap();
    let dict = dict_file.open().unwrap();
    assert_eq!(3, dict.num_keys());
    let inu = dict.lookup_exact("いぬ").unwrap().unwrap();
    assert_eq!("犬", inu.tokens[0].value);
}

#[test]
fn test_add_sources_reports_bad_row() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.tsv");
    let bad = dir.path().join("bad.tsv");
    fs::write(&good, "ねこ\t10\t20\t500\t猫\n").unwrap();
    fs::write(&bad, "いぬ\t1\t1\t300\t犬\nいぬ\t1\t1\n").unwrap();

    let mut builder = SystemDictionaryBuilder::new();
    let err = builder.add_sources(&[&good, &bad]).unwrap_err();
    match err {
        KanadicError::InvalidInputRow(e) => {
            assert_eq!(2, e.line);
            assert!(e.source.ends_with("bad.tsv"));
        }
        e => panic!("unexpected error: {e}"),
    }
    assert_eq!(0, builder.num_tokens());

    assert!(matches!(
        builder.add_sources(&[dir.path().join("missing.tsv")]),
        Err(KanadicError::Io(_))
    ));
}
