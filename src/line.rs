//! リクエストライン / ステータスラインのパース
//!
//! ```rust
//! use shiguredo_ringhttp::{Method, RequestLine, StatusLine, TargetForm, Version};
//!
//! let line = RequestLine::parse("GET /a/b?x=1 HTTP/1.1").unwrap();
//! assert_eq!(line.method, Method::Get);
//! assert_eq!(line.form, TargetForm::Origin);
//! assert_eq!(line.url.path, ["a", "b"]);
//! assert_eq!(line.version, Version::HTTP_11);
//!
//! let status = StatusLine::parse("HTTP/1.1 404 Not Found").unwrap();
//! assert_eq!(status.status_code, 404);
//! assert_eq!(status.reason, Some("Not Found"));
//! ```

use std::fmt;

use crate::error::Error;
use crate::url::{Url, parse_authority, parse_path_components, parse_query};

/// HTTP メソッド
///
/// 既知のトークンのみ受け付ける。大文字小文字は区別する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl Method {
    /// トークンからメソッドを取得
    pub fn parse(token: &str) -> Result<Self, Error> {
        Ok(match token {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "CONNECT" => Method::Connect,
            "OPTIONS" => Method::Options,
            "TRACE" => Method::Trace,
            "PATCH" => Method::Patch,
            _ => return Err(Error::invalid("invalid request line: unknown method")),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP バージョン
///
/// major は 0-3、minor は 0-9 の 1 桁。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const HTTP_09: Version = Version { major: 0, minor: 9 };
    pub const HTTP_10: Version = Version { major: 1, minor: 0 };
    pub const HTTP_11: Version = Version { major: 1, minor: 1 };

    /// `HTTP/` DIGIT `.` DIGIT をパース
    pub fn parse(s: &str) -> Result<Self, Error> {
        let digits = s
            .strip_prefix("HTTP/")
            .ok_or_else(|| Error::invalid("invalid HTTP version: missing \"HTTP/\""))?;
        match digits.as_bytes() {
            [major @ b'0'..=b'3', b'.', minor @ b'0'..=b'9'] => Ok(Version {
                major: major - b'0',
                minor: minor - b'0',
            }),
            _ => Err(Error::invalid("invalid HTTP version")),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

/// request-target の形式 (RFC 9112 Section 3.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetForm {
    /// origin-form: absolute-path [ "?" query ]
    /// 例: /path/to/resource?query=value
    Origin,
    /// absolute-form: absolute-URI
    /// 例: http://example.com/path
    Absolute,
    /// authority-form: uri-host ":" port (CONNECT のみ)
    /// 例: example.com:443
    Authority,
    /// asterisk-form: "*" (OPTIONS のみ)
    Asterisk,
}

/// パース済みリクエストライン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub method: Method,
    /// 生の request-target
    pub target: &'a str,
    pub form: TargetForm,
    /// origin-form では path と query のみが埋まる
    pub url: Url<'a>,
    pub version: Version,
}

impl<'a> RequestLine<'a> {
    /// `METHOD SP target SP HTTP/D.D` をパース (CRLF は含めない)
    pub fn parse(line: &'a str) -> Result<Self, Error> {
        let mut parts = line.splitn(3, ' ');
        let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::invalid("invalid request line: missing component"));
        };

        let method = Method::parse(method)?;
        let (form, url) = parse_target(method, target)?;
        let version = Version::parse(version)?;

        Ok(RequestLine {
            method,
            target,
            form,
            url,
            version,
        })
    }
}

/// request-target をパース
fn parse_target(method: Method, target: &str) -> Result<(TargetForm, Url<'_>), Error> {
    if target.is_empty() {
        return Err(Error::invalid("invalid request-target: empty"));
    }
    // フラグメントは request-target に含まれない
    if target.contains('#') {
        return Err(Error::invalid("invalid request-target: fragment not allowed"));
    }

    if target == "*" {
        if method != Method::Options {
            return Err(Error::invalid(
                "invalid request-target: asterisk-form requires OPTIONS",
            ));
        }
        return Ok((TargetForm::Asterisk, Url::default()));
    }

    if target.starts_with('/') {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, Vec::new()),
        };
        if query.iter().any(|p| has_forbidden_byte(p.key) || has_forbidden_byte(p.value)) {
            return Err(Error::invalid("invalid request-target: illegal character in query"));
        }
        let url = Url {
            path: parse_path_components(path)?,
            query,
            ..Url::default()
        };
        return Ok((TargetForm::Origin, url));
    }

    if target.contains("://") {
        let url = Url::parse(target)?;
        return Ok((TargetForm::Absolute, url));
    }

    if method != Method::Connect {
        return Err(Error::invalid(
            "invalid request-target: authority-form requires CONNECT",
        ));
    }
    let authority = parse_authority(target)?;
    if authority.username.is_some() {
        return Err(Error::invalid(
            "invalid request-target: userinfo not allowed in authority-form",
        ));
    }
    if authority.port.is_none() {
        return Err(Error::invalid(
            "invalid request-target: authority-form requires a port",
        ));
    }
    let url = Url {
        host: Some(authority.host),
        port: authority.port,
        ..Url::default()
    };
    Ok((TargetForm::Authority, url))
}

fn has_forbidden_byte(s: &str) -> bool {
    s.bytes().any(|b| b <= 0x20 || b == 0x7F)
}

/// パース済みステータスライン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine<'a> {
    pub version: Version,
    /// ステータスコード (100-599)
    pub status_code: u16,
    /// リーズンフレーズ (空なら `None`)
    pub reason: Option<&'a str>,
}

impl<'a> StatusLine<'a> {
    /// `HTTP/D.D SP 3DIGIT [SP reason]` をパース (CRLF は含めない)
    pub fn parse(line: &'a str) -> Result<Self, Error> {
        let (version, rest) = line
            .split_once(' ')
            .ok_or_else(|| Error::invalid("invalid status line: missing status code"))?;
        let version = Version::parse(version)?;

        let (code, reason) = match rest.split_once(' ') {
            Some((code, reason)) => (code, Some(reason)),
            None => (rest, None),
        };
        let status_code = parse_status_code(code)?;

        // reason-phrase = *( HTAB / SP / VCHAR / obs-text )
        let reason = reason.map(|r| r.trim_matches([' ', '\t'])).filter(|r| !r.is_empty());
        if let Some(r) = reason
            && r.bytes().any(|b| (b < 0x20 && b != b'\t') || b == 0x7F)
        {
            return Err(Error::invalid(
                "invalid status line: control character in reason phrase",
            ));
        }

        Ok(StatusLine {
            version,
            status_code,
            reason,
        })
    }

    /// ステータスコードが成功 (2xx) か確認
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// 3 桁の数字で 100-599 の範囲
fn parse_status_code(code: &str) -> Result<u16, Error> {
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid("invalid status line: status code must be 3 digits"));
    }
    let value = code
        .bytes()
        .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'));
    if !(100..=599).contains(&value) {
        return Err(Error::invalid("invalid status line: status code out of range"));
    }
    Ok(value)
}
