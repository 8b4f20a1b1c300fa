#![no_main]

use libfuzzer_sys::fuzz_target;
use shiguredo_ringhttp::url::{Url, parse_path_components, parse_query, percent_decode};
use shiguredo_ringhttp::{Header, RequestLine, StatusLine};

fuzz_target!(|data: &[u8]| {
    // UTF-8 文字列として解釈できる場合のみテスト
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(url) = Url::parse(s) {
            // パース結果はすべて入力の部分文字列
            assert!(url.scheme.is_some());
            assert!(url.host.is_some_and(|h| !h.is_empty()));
            for segment in &url.path {
                assert!(!segment.contains('/'));
            }
            let _ = url.query_value("a");
        }

        if let Ok(segments) = parse_path_components(s) {
            for segment in segments {
                assert!(!segment.contains(['/', '?', '#', ':']));
            }
        }

        for pair in parse_query(s) {
            assert!(!pair.key.contains('&'));
            assert!(!pair.value.contains('&'));
        }

        let _ = percent_decode(s);
        let _ = RequestLine::parse(s);
        let _ = StatusLine::parse(s);
        let _ = Header::parse(s);
    }
});
