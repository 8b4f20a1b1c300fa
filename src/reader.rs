//! リングバッファを使ったインクリメンタルなメッセージリーダー
//!
//! 呼び出しごとにバイトソースからリングバッファへ取り込み、ヘッダー終端 (`\r\n\r\n`) を
//! 探してリクエスト / レスポンスのヘッダーを組み立てる。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_ringhttp::{HttpHead, MessageReader, Method};
//!
//! let mut reader = MessageReader::new(1024);
//! let mut source: &[u8] = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
//!
//! let request = reader.read_request(&mut source).unwrap().unwrap();
//! assert_eq!(request.method, Method::Get);
//! assert_eq!(request.url.path, ["index.html"]);
//! assert_eq!(request.get_header("host"), Some("example.com"));
//! ```
//!
//! `Ok(None)` はまだヘッダーが揃っていないことを表す。ソースが読み取り可能になってから
//! もう一度呼び出す。`Err` は終端状態で、以降の呼び出しも同じエラーを返す。

use tracing::{debug, trace};

use crate::error::Error;
use crate::header::Header;
use crate::limits::{DEFAULT_BUFFER_CAPACITY, ReaderLimits};
use crate::line::{RequestLine, StatusLine};
use crate::message::{Request, Response};
use crate::ring::RingBuffer;
use crate::source::{ByteSource, ReadStatus};

const TERMINATOR: &[u8; 4] = b"\r\n\r\n";

/// リーダーの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderState {
    /// ヘッダー終端待ち
    AwaitingHeaders,
    /// 直前の呼び出しでメッセージを返した。次の呼び出しで次のメッセージに進む
    Complete,
    /// 失敗 (終端状態)
    Failed(Error),
}

/// インクリメンタルなメッセージリーダー
///
/// 1 接続につき 1 つ使う。内部にロックは無く、複数スレッドから同時に使ってはならない。
#[derive(Debug)]
pub struct MessageReader {
    ring: RingBuffer,
    limits: ReaderLimits,
    state: ReaderState,
    /// ヘッダー終端が無いことを確認済みのバイト数
    scanned: usize,
    /// 先頭の空行を読み飛ばし終え、メッセージの 1 バイト目を見たか
    started: bool,
}

impl Default for MessageReader {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

impl MessageReader {
    /// 容量 `capacity` のリングバッファを持つリーダーを作成
    ///
    /// ヘッダーブロック全体 (終端の CRLF CRLF を含む) が容量に収まらない
    /// メッセージは `Error::BufferOverflow` になる。
    pub fn new(capacity: usize) -> Self {
        Self::with_limits(capacity, ReaderLimits::default())
    }

    /// 制限付きでリーダーを作成
    pub fn with_limits(capacity: usize, limits: ReaderLimits) -> Self {
        Self {
            ring: RingBuffer::new(capacity),
            limits,
            state: ReaderState::AwaitingHeaders,
            scanned: 0,
            started: false,
        }
    }

    /// 制限設定を取得
    pub fn limits(&self) -> &ReaderLimits {
        &self.limits
    }

    /// 現在の状態を取得
    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    /// リングバッファを参照
    ///
    /// ヘッダーの後ろに届いたバイト (ボディや次のメッセージ) はここに残っている。
    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    /// リングバッファを可変参照
    ///
    /// ボディを呼び出し側で読み取る場合に使う。
    pub fn ring_mut(&mut self) -> &mut RingBuffer {
        &mut self.ring
    }

    /// リーダーをリセット
    ///
    /// バッファ内のデータも破棄する。
    pub fn reset(&mut self) {
        self.ring.clear();
        self.state = ReaderState::AwaitingHeaders;
        self.scanned = 0;
        self.started = false;
    }

    /// リクエストヘッダーを読み取る
    ///
    /// - `Ok(Some(request))`: ヘッダーが揃った。読み取り位置は終端の直後にある
    /// - `Ok(None)`: データ不足。ソースが読み取り可能になってから再度呼び出す
    /// - `Err(e)`: 失敗。リーダーは `Failed` 状態になる
    pub fn read_request<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<Option<Request<'_>>, Error> {
        let Some(end) = self.poll_head(source)? else {
            return Ok(None);
        };

        let block = self.ring.take_contiguous(end);
        match parse_head(&block[..end - TERMINATOR.len()], &self.limits, RequestLine::parse) {
            Ok((line, headers)) => {
                self.state = ReaderState::Complete;
                let request = Request::from_parts(line, headers);
                debug!(
                    method = %request.method,
                    target = request.target,
                    headers = request.headers.len(),
                    "request head parsed"
                );
                Ok(Some(request))
            }
            Err(e) => Err(record_failure(&mut self.state, e)),
        }
    }

    /// レスポンスヘッダーを読み取る
    ///
    /// 戻り値の意味は [`MessageReader::read_request`] と同じ。
    pub fn read_response<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<Option<Response<'_>>, Error> {
        let Some(end) = self.poll_head(source)? else {
            return Ok(None);
        };

        let block = self.ring.take_contiguous(end);
        match parse_head(&block[..end - TERMINATOR.len()], &self.limits, StatusLine::parse) {
            Ok((line, headers)) => {
                self.state = ReaderState::Complete;
                let response = Response::from_parts(line, headers);
                debug!(
                    status = response.status_code,
                    headers = response.headers.len(),
                    "response head parsed"
                );
                Ok(Some(response))
            }
            Err(e) => Err(record_failure(&mut self.state, e)),
        }
    }

    /// ヘッダーブロックが揃うまで取り込む
    ///
    /// 揃った場合は終端を含むヘッダーブロックの長さを返す。
    fn poll_head<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<Option<usize>, Error> {
        if let ReaderState::Failed(e) = &self.state {
            return Err(e.clone());
        }
        if self.state == ReaderState::Complete {
            self.state = ReaderState::AwaitingHeaders;
            self.scanned = 0;
            self.started = false;
        }

        // パイプラインで既に届いているデータを先に見る
        if let Some(end) = self.scan()? {
            return Ok(Some(end));
        }

        loop {
            if self.ring.is_full() {
                let error = Error::BufferOverflow {
                    size: self.ring.can_read_count(),
                    limit: self.ring.capacity(),
                };
                return Err(self.fail(error));
            }

            let spare = self.ring.spare_mut();
            let offered = spare.len();
            let status = match source.try_read(spare) {
                Ok(status) => status,
                Err(e) => return Err(self.fail(e.into())),
            };

            match status {
                ReadStatus::Data(n) => {
                    let n = n.min(offered);
                    self.ring.commit(n);
                    trace!(
                        read = n,
                        buffered = self.ring.can_read_count(),
                        "filled ring buffer"
                    );
                    if let Some(end) = self.scan()? {
                        return Ok(Some(end));
                    }
                    // 短い読み取りはソースが今ある分を出し切ったとみなす
                    if n < offered {
                        return Ok(None);
                    }
                }
                ReadStatus::Pending => return Ok(None),
                ReadStatus::EndOfStream => {
                    let error = if self.ring.is_empty() {
                        Error::ConnectionClosed
                    } else {
                        Error::invalid("unexpected end of stream before end of headers")
                    };
                    return Err(self.fail(error));
                }
            }
        }
    }

    /// バッファ内のヘッダー終端を探す
    fn scan(&mut self) -> Result<Option<usize>, Error> {
        if !self.started {
            // メッセージ前の空行 (CRLF) は読み飛ばす (RFC 9112 Section 2.2)
            loop {
                let mut head = [0u8; 2];
                let n = self.ring.peek_bytes(&mut head);
                match &head[..n] {
                    b"\r\n" => {
                        self.ring.consume(2);
                    }
                    b"" | b"\r" => return Ok(None),
                    _ => break,
                }
            }
            self.started = true;
        }

        let data = self.ring.make_contiguous();
        let from = self.scanned.saturating_sub(TERMINATOR.len() - 1);
        if let Some(pos) = data[from..].windows(TERMINATOR.len()).position(|w| w == TERMINATOR) {
            let end = from + pos + TERMINATOR.len();
            trace!(end, "found end of headers");
            return Ok(Some(end));
        }

        let len = data.len();
        let line_start = data
            .windows(2)
            .rposition(|w| w == b"\r\n")
            .map_or(0, |p| p + 2);
        self.scanned = len;

        // 末尾の '\r' は行末 CRLF の前半かもしれないので行長に含めない
        let size = len - line_start - usize::from(data.last() == Some(&b'\r'));
        if size > self.limits.max_header_line_size {
            let error = Error::HeaderLineTooLong {
                size,
                limit: self.limits.max_header_line_size,
            };
            return Err(self.fail(error));
        }
        Ok(None)
    }

    fn fail(&mut self, error: Error) -> Error {
        record_failure(&mut self.state, error)
    }
}

fn record_failure(state: &mut ReaderState, error: Error) -> Error {
    debug!(%error, "message reader failed");
    *state = ReaderState::Failed(error.clone());
    error
}

/// ヘッダーブロック (終端の CRLF CRLF を除く) をスタートラインとヘッダーに分ける
fn parse_head<'a, L>(
    block: &'a [u8],
    limits: &ReaderLimits,
    parse_start_line: impl FnOnce(&'a str) -> Result<L, Error>,
) -> Result<(L, Vec<Header<'a>>), Error> {
    let text = std::str::from_utf8(block)
        .map_err(|e| Error::invalid(format!("invalid header block: {e}")))?;

    let mut lines = text.split("\r\n");
    let start_line = lines.next().unwrap_or_default();
    check_line_size(start_line, limits)?;
    let start_line = parse_start_line(start_line)?;

    let mut headers = Vec::new();
    for line in lines {
        check_line_size(line, limits)?;
        if headers.len() >= limits.max_headers_count {
            return Err(Error::TooManyHeaders {
                count: headers.len() + 1,
                limit: limits.max_headers_count,
            });
        }
        headers.push(Header::parse(line)?);
    }

    Ok((start_line, headers))
}

fn check_line_size(line: &str, limits: &ReaderLimits) -> Result<(), Error> {
    if line.len() > limits.max_header_line_size {
        return Err(Error::HeaderLineTooLong {
            size: line.len(),
            limit: limits.max_header_line_size,
        });
    }
    Ok(())
}
