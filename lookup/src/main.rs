//! システム辞書を検索するユーティリティ
//!
//! このバイナリは、標準入力から1行ずつ読みを読み込み、その先頭に一致する
//! すべての読みのトークンを`読み\t表記\t左ID\t右ID\tコスト`の形式で出力します。

use std::error::Error;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;

use kanadic::{DictionaryFile, LookupEntry, TokenAttribute};

use clap::Parser;

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "lookup", about = "Looks up keys in a system dictionary")]
struct Args {
    /// System dictionary.
    #[clap(short = 'i', long)]
    sysdic: PathBuf,

    /// The dictionary is compressed with zstd.
    #[clap(long)]
    zstd: bool,

    /// Prints only exact matches instead of every prefix.
    #[clap(short = 'e', long)]
    exact: bool,
}

fn write_entry<W>(out: &mut W, entry: &LookupEntry) -> std::io::Result<()>
where
    W: Write,
{
    for t in &entry.tokens {
        write!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            t.key, t.value, t.left_id, t.right_id, t.cost
        )?;
        if t.attribute.contains(TokenAttribute::SPELLING_CORRECTION) {
            out.write_all(b"\tSPELLING_CORRECTION")?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// メイン関数
///
/// 辞書をロードし、標準入力の各行を検索して結果を標準出力に出力します。
/// 各行の結果の後には空行を出力します。
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    eprintln!("Loading the dictionary...");
    let dict_file = if args.zstd {
        DictionaryFile::from_zstd(&args.sysdic)?
    } else {
        DictionaryFile::from_path(&args.sysdic)?
    };
    let dict = dict_file.open()?;

    eprintln!("Ready to look up {} keys", dict.num_keys());

    let is_tty = atty::is(atty::Stream::Stdout);

    let out = std::io::stdout();
    let mut out = BufWriter::new(out.lock());
    let lines = std::io::stdin().lock().lines();
    for line in lines {
        let line = line?;
        if args.exact {
            if let Some(entry) = dict.lookup_exact(&line)? {
                write_entry(&mut out, &entry)?;
            }
        } else {
            for entry in dict.lookup_exact_and_prefixes(&line)? {
                write_entry(&mut out, &entry)?;
            }
        }
        out.write_all(b"\n")?;
        if is_tty {
            out.flush()?;
        }
    }

    Ok(())
}
