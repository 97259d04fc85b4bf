//! kanadicのテストモジュール群
//!
//! 簡潔ビットベクトル、LOUDSトライ、辞書の構築と検索、ファイルからの読み込みを
//! 組み合わせた動作を検証します。

mod loading;
mod succinct;
