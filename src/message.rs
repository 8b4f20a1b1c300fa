//! パース済みメッセージ (ボディなし)

use crate::header::{Header, HttpHead};
use crate::line::{Method, RequestLine, StatusLine, TargetForm, Version};
use crate::url::Url;

/// リクエストヘッダー
///
/// 文字列はすべてリングバッファ (またはパースに渡した入力) を借用する。
/// 次の読み取りより長く保持したい場合は呼び出し側でコピーすること。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: Method,
    /// 生の request-target
    pub target: &'a str,
    pub form: TargetForm,
    pub url: Url<'a>,
    pub version: Version,
    /// ヘッダー (受信順、重複あり)
    pub headers: Vec<Header<'a>>,
}

impl<'a> Request<'a> {
    pub(crate) fn from_parts(line: RequestLine<'a>, headers: Vec<Header<'a>>) -> Self {
        Self {
            method: line.method,
            target: line.target,
            form: line.form,
            url: line.url,
            version: line.version,
            headers,
        }
    }

    /// 新しいリクエストを作成 (HTTP/1.1)
    ///
    /// `target` はパースしない。エンコード用。
    pub fn new(method: Method, target: &'a str) -> Self {
        Self {
            method,
            target,
            form: TargetForm::Origin,
            url: Url::default(),
            version: Version::HTTP_11,
            headers: Vec::new(),
        }
    }

    /// ヘッダーを追加 (ビルダーパターン)
    pub fn header(mut self, name: &'a str, value: &'a str) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }
}

impl<'a> HttpHead<'a> for Request<'a> {
    fn version(&self) -> Version {
        self.version
    }

    fn headers(&self) -> &[Header<'a>] {
        &self.headers
    }
}

/// レスポンスヘッダー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<'a> {
    pub version: Version,
    /// ステータスコード (100-599)
    pub status_code: u16,
    pub reason: Option<&'a str>,
    /// ヘッダー (受信順、重複あり)
    pub headers: Vec<Header<'a>>,
}

impl<'a> Response<'a> {
    pub(crate) fn from_parts(line: StatusLine<'a>, headers: Vec<Header<'a>>) -> Self {
        Self {
            version: line.version,
            status_code: line.status_code,
            reason: line.reason,
            headers,
        }
    }

    /// 新しいレスポンスを作成 (HTTP/1.1)
    pub fn new(status_code: u16, reason: &'a str) -> Self {
        Self {
            version: Version::HTTP_11,
            status_code,
            reason: (!reason.is_empty()).then_some(reason),
            headers: Vec::new(),
        }
    }

    /// ヘッダーを追加 (ビルダーパターン)
    pub fn header(mut self, name: &'a str, value: &'a str) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// ステータスコードが成功 (2xx) か確認
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// ステータスコードがリダイレクト (3xx) か確認
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code)
    }

    /// ステータスコードがクライアントエラー (4xx) か確認
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    /// ステータスコードがサーバーエラー (5xx) か確認
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }

    /// ステータスコードが情報レスポンス (1xx) か確認
    pub fn is_informational(&self) -> bool {
        (100..200).contains(&self.status_code)
    }
}

impl<'a> HttpHead<'a> for Response<'a> {
    fn version(&self) -> Version {
        self.version
    }

    fn headers(&self) -> &[Header<'a>] {
        &self.headers
    }
}
