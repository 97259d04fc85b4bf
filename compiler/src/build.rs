//! システム辞書のビルドモジュール
//!
//! タブ区切りの辞書ソースファイルからバイナリ形式のシステム辞書を構築します。
//! 出力は一時ファイルに書き出し、すべて成功した場合にのみ出力先へ移動します。

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use kanadic::dictionary::config::TokenArrayConfig;
use kanadic::errors::KanadicError;
use kanadic::{BuiltDictionary, SystemDictionaryBuilder};

use clap::Parser;
use tempfile::NamedTempFile;

/// ビルドコマンドの引数
#[derive(Parser, Debug)]
#[clap(
    name = "build",
    about = "A program to build the system dictionary."
)]
pub struct Args {
    /// Dictionary source files (tab-separated). Can be given multiple times.
    #[clap(short = 'i', long = "input", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// File to which the binary dictionary is output.
    #[clap(short = 'o', long)]
    sysdic_out: PathBuf,

    /// Compress the output with zstd.
    #[clap(long)]
    zstd: bool,

    /// Base chunk length of the token array in bytes.
    #[clap(long, default_value = "4")]
    base_length: usize,

    /// Step chunk length of the token array in bytes.
    #[clap(long, default_value = "1")]
    step_length: usize,
}

/// ビルド処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 出力ファイルの確定に失敗した
    #[error("Failed to persist the output: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// 辞書構築エラー
    #[error("Dictionary building failed: {0}")]
    Kanadic(#[from] KanadicError),
}

/// ビルドコマンドを実行する
///
/// # 引数
///
/// * `args` - ビルドコマンドの引数
///
/// # エラー
///
/// ソースの読み込み、辞書構築、書き出しのいずれかに失敗した場合、`BuildError`を返します。
/// その場合、出力先のファイルは作られません。
pub fn run(args: Args) -> Result<(), BuildError> {
    let config = TokenArrayConfig {
        base_length: args.base_length,
        step_length: args.step_length,
    };

    println!("Reading {} source file(s)...", args.inputs.len());
    let mut builder = SystemDictionaryBuilder::new().with_array_config(config);
    builder.add_sources(&args.inputs)?;

    println!("Compiling the system dictionary...");
    let dict = builder.build()?;
    println!("{}", dict.stats());

    println!("Writing the system dictionary...");
    write_dictionary(&dict, &args)?;

    println!("Successfully built the dictionary to {}", args.sysdic_out.display());
    Ok(())
}

fn write_dictionary(dict: &BuiltDictionary, args: &Args) -> Result<(), BuildError> {
    let dir = match args.sysdic_out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut temp_file = NamedTempFile::new_in(dir)?;
    {
        let mut wtr = BufWriter::new(temp_file.as_file_mut());
        if args.zstd {
            let mut encoder = zstd::Encoder::new(&mut wtr, 19)?;
            dict.write(&mut encoder)?;
            encoder.finish()?;
        } else {
            dict.write(&mut wtr)?;
        }
        wtr.flush()?;
    }
    temp_file.persist(&args.sysdic_out)?;
    Ok(())
}
