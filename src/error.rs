use std::io;

/// パース / 読み取りエラー
///
/// 文法違反はすべて [`Error::InvalidValue`] に集約される。
/// それ以外のバリアントは設定した制限、接続終了、I/O 失敗を表す。
/// どのエラーも接続を閉じるべきことを意味し、途中からの回復手段はない。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// 文法違反、または終端前のストリーム終了
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// ヘッダーブロックがリングバッファに収まらない
    #[error("buffer overflow: {size} >= {limit}")]
    BufferOverflow { size: usize, limit: usize },
    /// ヘッダー数超過
    #[error("too many headers: {count} > {limit}")]
    TooManyHeaders { count: usize, limit: usize },
    /// ヘッダー行が長すぎる
    #[error("header line too long: {size} > {limit}")]
    HeaderLineTooLong { size: usize, limit: usize },
    /// 新しいメッセージの 1 バイト目より前にストリームが終了した
    ///
    /// 終端前のストリーム終了のうち [`Error::InvalidValue`] にならないのはこの場合だけ。
    /// メッセージの途中で終了した場合は [`Error::InvalidValue`] になる。
    #[error("connection closed")]
    ConnectionClosed,
    /// バイトソースの I/O エラー
    #[error("I/O error ({kind}): {message}")]
    Io { kind: io::ErrorKind, message: String },
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidValue(msg.into())
    }

    /// 文法違反かどうか
    pub fn is_invalid_value(&self) -> bool {
        matches!(self, Error::InvalidValue(_))
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}
