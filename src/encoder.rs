use crate::message::{Request, Response};

/// リクエストヘッダーをエンコード
///
/// リクエストラインには生の `target` をそのまま使う。ボディは含めない。
pub fn encode_request_head(request: &Request) -> Vec<u8> {
    let mut buf = Vec::new();

    // Request line: METHOD SP request-target SP VERSION CRLF
    buf.extend_from_slice(request.method.as_str().as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(request.target.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(request.version.to_string().as_bytes());
    buf.extend_from_slice(b"\r\n");

    encode_headers(&mut buf, &request.headers);
    buf
}

/// レスポンスヘッダーをエンコード
///
/// reason-phrase が無い場合は `HTTP/1.1 204 ` のように SP で終える。
pub fn encode_response_head(response: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line: VERSION SP STATUS-CODE SP [REASON-PHRASE] CRLF
    buf.extend_from_slice(response.version.to_string().as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(response.status_code.to_string().as_bytes());
    buf.push(b' ');
    if let Some(reason) = response.reason {
        buf.extend_from_slice(reason.as_bytes());
    }
    buf.extend_from_slice(b"\r\n");

    encode_headers(&mut buf, &response.headers);
    buf
}

fn encode_headers(buf: &mut Vec<u8>, headers: &[crate::header::Header]) {
    for header in headers {
        buf.extend_from_slice(header.name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(header.value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // End of headers
    buf.extend_from_slice(b"\r\n");
}
