//! # shiguredo_ringhttp
//!
//! リングバッファを使ったインクリメンタルな HTTP/1.x ヘッダーパーサーと URL パーサー
//!
//! ## 特徴
//!
//! - **固定長バッファ**: 接続ごとに容量を決めたリングバッファ 1 つだけを使う
//! - **インクリメンタル**: データが揃うまで `Ok(None)` を返し、何度でも呼び出せる
//! - **ゼロコピー**: パース結果はリングバッファ内のバイト列を借用する
//! - **I/O 非依存**: 読み取りは [`ByteSource`] トレイト経由で、ノンブロッキングソケットにも使える
//!
//! ## 使い方
//!
//! ### サーバー (リクエスト受信)
//!
//! ```rust
//! use shiguredo_ringhttp::{HttpHead, MessageReader, Method, TargetForm};
//!
//! let mut reader = MessageReader::new(4096);
//! let mut source: &[u8] = b"GET /users/42?fields=name HTTP/1.1\r\nHost: example.com\r\n\r\n";
//!
//! let request = reader.read_request(&mut source)?.expect("complete request");
//! assert_eq!(request.method, Method::Get);
//! assert_eq!(request.form, TargetForm::Origin);
//! assert_eq!(request.url.path, ["users", "42"]);
//! assert_eq!(request.url.query_value("fields"), Some("name"));
//! assert!(request.is_keep_alive());
//! # Ok::<(), shiguredo_ringhttp::Error>(())
//! ```
//!
//! ### クライアント (レスポンス受信)
//!
//! ```rust
//! use shiguredo_ringhttp::{HttpHead, Method, MessageReader, Request, encode_request_head};
//!
//! let request = Request::new(Method::Get, "/").header("Host", "example.com");
//! let bytes = encode_request_head(&request);
//! // bytes を送信...
//! # let _ = bytes;
//!
//! let mut reader = MessageReader::default();
//! let mut source: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello";
//! let response = reader.read_response(&mut source)?.expect("complete response");
//! assert_eq!(response.status_code, 200);
//! assert_eq!(response.get_header("content-length"), Some("5"));
//! // ボディはリングバッファに残っている
//! assert_eq!(reader.ring().can_read_count(), 5);
//! # Ok::<(), shiguredo_ringhttp::Error>(())
//! ```

mod encoder;
mod error;
mod header;
mod limits;
mod line;
mod message;
mod reader;
mod ring;
mod source;
pub mod url;

pub use encoder::{encode_request_head, encode_response_head};
pub use error::Error;
pub use header::{Header, HttpHead};
pub use limits::{DEFAULT_BUFFER_CAPACITY, ReaderLimits};
pub use line::{Method, RequestLine, StatusLine, TargetForm, Version};
pub use message::{Request, Response};
pub use reader::{MessageReader, ReaderState};
pub use ring::RingBuffer;
pub use source::{ByteSource, IoSource, ReadStatus};
pub use url::{QueryPair, Url};
