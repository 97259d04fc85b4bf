//! エラー型の定義
//!
//! このモジュールは、kanadicライブラリで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt;

/// kanadic専用のResult型
///
/// エラー型としてデフォルトで[`KanadicError`]を使用します。
pub type Result<T, E = KanadicError> = std::result::Result<T, E>;

/// kanadicのエラー型
///
/// 辞書の構築・読み込み・検索で発生する可能性のあるすべてのエラーを表現します。
/// いずれのエラーも処理単位(1行、1ビルド、1ロード)に対して致命的であり、
/// 部分的な結果は返されません。
#[derive(Debug, thiserror::Error)]
pub enum KanadicError {
    /// コンテナまたは内部イメージのヘッダ・フレーミングが壊れている
    #[error(transparent)]
    MalformedContainer(MalformedContainerError),

    /// トークンのデコード中に予約済みのフラグの組み合わせに遭遇した
    #[error(transparent)]
    InvalidFlagCombination(InvalidFlagCombinationError),

    /// ID・コスト・品詞がビット幅を超えている
    #[error(transparent)]
    ValueOutOfRange(ValueOutOfRangeError),

    /// 頻出品詞テーブルの構築で内部不変条件が破れた
    #[error("InconsistentFrequentPosResult: expected {expected} entries, assigned {actual}")]
    InconsistentFrequentPosResult {
        /// 頻度集計から期待されるエントリ数
        expected: usize,
        /// 実際に割り当てたID数
        actual: usize,
    },

    /// 入力行が不正
    #[error(transparent)]
    InvalidInputRow(InvalidInputRowError),

    /// 無効な引数エラー
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 無効な状態エラー
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// UTF-8エンコーディングエラー
    #[error(transparent)]
    Utf8(std::str::Utf8Error),

    /// I/Oエラー
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// ソースファイルを読むスレッドがパニックした
    #[error("Background thread panicked: {0}")]
    ThreadPanic(String),
}

impl KanadicError {
    /// コンテナ破損エラーを生成します
    ///
    /// # 引数
    ///
    /// * `section` - 破損が見つかった部分の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn malformed<S>(section: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::MalformedContainer(MalformedContainerError {
            section,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_flags<S>(flags: u8, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFlagCombination(InvalidFlagCombinationError {
            flags,
            msg: msg.into(),
        })
    }

    /// 範囲外エラーを生成します
    ///
    /// # 引数
    ///
    /// * `field` - フィールド名
    /// * `value` - 実際の値
    /// * `max` - 許容される最大値
    pub(crate) fn out_of_range(field: &'static str, value: u64, max: u64) -> Self {
        Self::ValueOutOfRange(ValueOutOfRangeError { field, value, max })
    }

    /// 入力行エラーを生成します
    ///
    /// # 引数
    ///
    /// * `source` - 入力元の名前(ファイル名など)
    /// * `line` - 1始まりの行番号
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_row<N, S>(source: N, line: usize, msg: S) -> Self
    where
        N: Into<String>,
        S: Into<String>,
    {
        Self::InvalidInputRow(InvalidInputRowError {
            source: source.into(),
            line,
            msg: msg.into(),
        })
    }

    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効な状態エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `cause` - エラーの原因
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }
}

/// コンテナやイメージのレイアウトが壊れている場合に使用されるエラー
#[derive(Debug)]
pub struct MalformedContainerError {
    /// 破損箇所
    pub(crate) section: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for MalformedContainerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MalformedContainer: {}: {}", self.section, self.msg)
    }
}

impl Error for MalformedContainerError {}

/// トークンレコードのフラグが解釈できない場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFlagCombinationError {
    /// 問題のフラグバイト
    pub(crate) flags: u8,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFlagCombinationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "InvalidFlagCombination: flags={:#04x}: {}",
            self.flags, self.msg
        )
    }
}

impl Error for InvalidFlagCombinationError {}

/// 値がエンコード可能な範囲を超えた場合に使用されるエラー
#[derive(Debug)]
pub struct ValueOutOfRangeError {
    /// フィールド名
    pub(crate) field: &'static str,

    /// 実際の値
    pub(crate) value: u64,

    /// 最大値
    pub(crate) max: u64,
}

impl fmt::Display for ValueOutOfRangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ValueOutOfRange: {} must be <= {:#x}, got {:#x}",
            self.field, self.max, self.value
        )
    }
}

impl Error for ValueOutOfRangeError {}

/// 辞書ソースの行が不正な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidInputRowError {
    /// 入力元
    pub(crate) source: String,

    /// 行番号(1始まり)
    pub(crate) line: usize,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidInputRowError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "InvalidInputRow: {}:{}: {}",
            self.source, self.line, self.msg
        )
    }
}

impl Error for InvalidInputRowError {}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidStateError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}

impl From<std::str::Utf8Error> for KanadicError {
    fn from(error: std::str::Utf8Error) -> Self {
        Self::Utf8(error)
    }
}
