//! ヘッダー行のパースとヘッダーリスト操作

use crate::error::Error;
use crate::line::Version;

/// ヘッダー (名前と値の組)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> Header<'a> {
    pub fn new(name: &'a str, value: &'a str) -> Self {
        Self { name, value }
    }

    /// `name ":" OWS value OWS` をパース (CRLF は含めない)
    ///
    /// 最初の `:` で分割する。2 つ目以降の `:` は値の一部としてそのまま残す。
    ///
    /// ```rust
    /// use shiguredo_ringhttp::Header;
    ///
    /// let header = Header::parse("foo: bar : baz").unwrap();
    /// assert_eq!(header.name, "foo");
    /// assert_eq!(header.value, "bar : baz");
    /// ```
    pub fn parse(line: &'a str) -> Result<Self, Error> {
        if line.starts_with([' ', '\t']) {
            return Err(Error::invalid("invalid header line: obs-fold"));
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::invalid("invalid header line: missing colon"))?;
        if name.is_empty() {
            return Err(Error::invalid("invalid header line: empty name"));
        }
        if !name.bytes().all(is_token_char) {
            return Err(Error::invalid("invalid header line: invalid name"));
        }

        let value = value.trim_matches([' ', '\t']);
        if value.is_empty() {
            return Err(Error::invalid("invalid header line: empty value"));
        }
        // field-content には制御文字を含めない (RFC 9110 Section 5.5)
        if value.bytes().any(|b| (b < 0x20 && b != b'\t') || b == 0x7F) {
            return Err(Error::invalid(
                "invalid header line: invalid value (contains control characters)",
            ));
        }

        Ok(Header { name, value })
    }
}

/// トークン文字か確認
pub(crate) fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'0'..=b'9' | b'A'..=b'Z' | b'^' | b'_' | b'`' | b'a'..=b'z' | b'|' | b'~'
    )
}

/// HTTP ヘッダー操作のための共通トレイト
///
/// 値はメッセージと同じライフタイム `'a` で返す。
pub trait HttpHead<'a> {
    /// HTTP バージョンを取得
    fn version(&self) -> Version;

    /// ヘッダーリストを取得 (受信順、重複あり)
    fn headers(&self) -> &[Header<'a>];

    /// ヘッダーを取得 (大文字小文字を区別しない)
    fn get_header(&self, name: &str) -> Option<&'a str> {
        self.headers()
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value)
    }

    /// 指定した名前のヘッダーをすべて取得
    fn get_headers(&self, name: &str) -> Vec<&'a str> {
        self.headers()
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value)
            .collect()
    }

    /// ヘッダーが存在するか確認
    fn has_header(&self, name: &str) -> bool {
        self.headers()
            .iter()
            .any(|h| h.name.eq_ignore_ascii_case(name))
    }

    /// Connection ヘッダーの値を取得
    fn connection(&self) -> Option<&'a str> {
        self.get_header("Connection")
    }

    /// キープアライブ接続かどうかを判定
    ///
    /// 複数の Connection ヘッダーはリストとして結合して扱う。
    /// close トークンがあれば false、keep-alive トークンがあれば true、
    /// どちらも無ければ HTTP/1.1 以上で true。
    fn is_keep_alive(&self) -> bool {
        let mut has_keep_alive = false;
        for conn in self.get_headers("Connection") {
            for token in conn.split(',') {
                let token = token.trim();
                if token.eq_ignore_ascii_case("close") {
                    return false;
                }
                if token.eq_ignore_ascii_case("keep-alive") {
                    has_keep_alive = true;
                }
            }
        }

        has_keep_alive || self.version() >= Version::HTTP_11
    }
}
