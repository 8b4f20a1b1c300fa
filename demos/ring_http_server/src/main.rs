//! リングバッファを使った HTTP サーバーの例 (std::net + スレッド)
//!
//! 受け取ったリクエストヘッダーの内容をテキストで返す。
//! ボディ付きのリクエストには 501 を返して接続を閉じる。
//!
//! 使い方:
//!   cargo run -p ring_http_server -- --port 8080 --capacity 4096
//!
//!   # ログレベルは RUST_LOG で変更できる
//!   RUST_LOG=shiguredo_ringhttp=trace cargo run -p ring_http_server

use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};

use shiguredo_ringhttp::url::percent_decode;
use shiguredo_ringhttp::{
    DEFAULT_BUFFER_CAPACITY, Error, HttpHead, IoSource, MessageReader, Request, Response,
    encode_response_head,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

struct ServerOptions {
    port: u16,
    capacity: usize,
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = parse_args()?;

    let addr = format!("0.0.0.0:{}", options.port);
    let listener = TcpListener::bind(&addr)?;
    info!(%addr, capacity = options.capacity, "HTTP server listening");

    loop {
        let (stream, peer_addr) = listener.accept()?;
        let capacity = options.capacity;

        std::thread::spawn(move || {
            if let Err(e) = handle_client(stream, peer_addr, capacity) {
                warn!(%peer_addr, error = %e, "client error");
            }
        });
    }
}

fn parse_args() -> Result<ServerOptions, BoxError> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "ring_http_server";

    // --help フラグ
    noargs::HELP_FLAG.take_help(&mut args);

    // --version フラグ
    let version_flag: bool = noargs::flag("version")
        .short('V')
        .doc("Show version")
        .take(&mut args)
        .is_present();
    if version_flag {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    // --port オプション
    let port: u16 = noargs::opt("port")
        .short('p')
        .doc("Port to listen on")
        .default("8080")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // --capacity オプション
    let capacity: usize = noargs::opt("capacity")
        .short('c')
        .doc("Ring buffer capacity per connection in bytes (default: 16384)")
        .take(&mut args)
        .present_and_then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?
        .unwrap_or(DEFAULT_BUFFER_CAPACITY);

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        std::process::exit(0);
    }

    Ok(ServerOptions { port, capacity })
}

fn handle_client(
    stream: TcpStream,
    peer_addr: SocketAddr,
    capacity: usize,
) -> Result<(), BoxError> {
    info!(%peer_addr, "connection accepted");

    let mut source = IoSource::new(stream);
    let mut reader = MessageReader::new(capacity);

    loop {
        let keep_alive = match reader.read_request(&mut source) {
            Ok(Some(request)) => {
                info!(
                    %peer_addr,
                    method = %request.method,
                    target = request.target,
                    version = %request.version,
                    "request"
                );
                respond(source.get_mut(), &request)?
            }
            // ブロッキングソケットの短い読み取り。次の呼び出しで続きを待つ
            Ok(None) => continue,
            Err(Error::ConnectionClosed) => {
                info!(%peer_addr, "connection closed by peer");
                return Ok(());
            }
            Err(e) => {
                warn!(%peer_addr, error = %e, "request failed");
                if let Some(response) = error_response(&e) {
                    source.get_mut().write_all(&encode_response_head(&response))?;
                }
                return Err(e.into());
            }
        };

        if !keep_alive {
            info!(%peer_addr, "connection close requested");
            return Ok(());
        }
    }
}

/// 読み取りエラーに対して返すレスポンス
///
/// I/O エラーのソケットには書き込まない。
fn error_response(error: &Error) -> Option<Response<'static>> {
    match error {
        Error::Io { .. } | Error::ConnectionClosed => None,
        Error::InvalidValue(_)
        | Error::BufferOverflow { .. }
        | Error::TooManyHeaders { .. }
        | Error::HeaderLineTooLong { .. } => Some(
            Response::new(400, "Bad Request")
                .header("Content-Length", "0")
                .header("Connection", "close"),
        ),
    }
}

/// レスポンスを書き込み、接続を続けるかを返す
fn respond(stream: &mut TcpStream, request: &Request) -> Result<bool, BoxError> {
    if has_body(request) {
        debug!("request body is not supported");
        let head = encode_response_head(
            &Response::new(501, "Not Implemented")
                .header("Content-Length", "0")
                .header("Connection", "close"),
        );
        stream.write_all(&head)?;
        return Ok(false);
    }

    let keep_alive = request.is_keep_alive();
    let body = describe(request);
    let content_length = body.len().to_string();
    let connection = if keep_alive { "keep-alive" } else { "close" };

    let head = encode_response_head(
        &Response::new(200, "OK")
            .header("Content-Type", "text/plain; charset=utf-8")
            .header("Content-Length", &content_length)
            .header("Connection", connection)
            .header("Server", "shiguredo_ringhttp"),
    );
    stream.write_all(&head)?;
    stream.write_all(body.as_bytes())?;
    Ok(keep_alive)
}

fn has_body(request: &Request) -> bool {
    request.has_header("Transfer-Encoding")
        || request
            .get_header("Content-Length")
            .is_some_and(|v| v.trim() != "0")
}

/// リクエストヘッダーの内容をテキストにする
fn describe(request: &Request) -> String {
    let mut body = format!(
        "Method: {}\nTarget: {}\nForm: {:?}\nVersion: {}\n",
        request.method, request.target, request.form, request.version
    );

    if let Some(host) = request.url.host {
        body.push_str(&format!("Host: {}\n", host));
    }
    if let Some(port) = request.url.port {
        body.push_str(&format!("Port: {}\n", port));
    }

    body.push_str("\nPath:\n");
    for segment in &request.url.path {
        body.push_str(&format!("  {}\n", decoded(segment)));
    }

    if !request.url.query.is_empty() {
        body.push_str("\nQuery:\n");
        for pair in &request.url.query {
            body.push_str(&format!("  {} = {}\n", decoded(pair.key), decoded(pair.value)));
        }
    }

    body.push_str("\nHeaders:\n");
    for header in &request.headers {
        body.push_str(&format!("  {}: {}\n", header.name, header.value));
    }

    body
}

/// デコードできなければ生の値を使う
fn decoded(s: &str) -> String {
    percent_decode(s)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| s.to_string())
}
