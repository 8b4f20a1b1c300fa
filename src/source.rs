//! バイトソース
//!
//! `MessageReader` がリングバッファへデータを取り込む相手。
//! ブロッキング / ノンブロッキングどちらのディスクリプタでも同じ契約で扱えるよう、
//! 「今は無い」と「今後も無い」を戻り値で区別する。

use std::io::{self, Read};

/// 1 回の読み取り結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// `n` バイト読み取った (`n > 0`)
    Data(usize),
    /// 現在読めるデータが無い。後で再度呼び出す
    Pending,
    /// これ以上データは来ない
    EndOfStream,
}

/// バイトソース
///
/// ブロッキングソースでは `try_read` が呼び出しスレッドをブロックしてよい。
/// リーダー側がブロックする箇所はここだけである。
pub trait ByteSource {
    /// `dst` に読み取る
    fn try_read(&mut self, dst: &mut [u8]) -> io::Result<ReadStatus>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn try_read(&mut self, dst: &mut [u8]) -> io::Result<ReadStatus> {
        (**self).try_read(dst)
    }
}

/// スライスをソースとして扱う
///
/// 中身を読み切ると `EndOfStream` を返す。
impl ByteSource for &[u8] {
    fn try_read(&mut self, dst: &mut [u8]) -> io::Result<ReadStatus> {
        if self.is_empty() {
            return Ok(ReadStatus::EndOfStream);
        }
        if dst.is_empty() {
            return Ok(ReadStatus::Pending);
        }
        let n = self.len().min(dst.len());
        let (head, rest) = self.split_at(n);
        dst[..n].copy_from_slice(head);
        *self = rest;
        Ok(ReadStatus::Data(n))
    }
}

/// `std::io::Read` を `ByteSource` に変換するアダプタ
///
/// - `Ok(0)` は `EndOfStream`
/// - `WouldBlock` と `TimedOut` は `Pending`
/// - `Interrupted` は読み直す
///
/// ノンブロッキングソケットと組み合わせる場合は、外部の readiness 通知を受けてから
/// `read_request` / `read_response` を呼ぶ。
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
}

impl<R: Read> IoSource<R> {
    /// アダプタを作成
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// 内部のリーダーを参照
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// 内部のリーダーを可変参照
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// 内部のリーダーを取り出す
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn try_read(&mut self, dst: &mut [u8]) -> io::Result<ReadStatus> {
        if dst.is_empty() {
            return Ok(ReadStatus::Pending);
        }
        loop {
            match self.inner.read(dst) {
                Ok(0) => return Ok(ReadStatus::EndOfStream),
                Ok(n) => return Ok(ReadStatus::Data(n)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return Ok(ReadStatus::Pending);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
