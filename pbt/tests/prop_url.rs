//! URL パーサーのプロパティテスト (url.rs)

use std::borrow::Cow;

use pbt::{hostname, join_path, join_query, path_segment, path_segments, query_pairs, scheme};
use proptest::prelude::*;
use shiguredo_ringhttp::url::{QueryPair, Url, parse_path_components, parse_query, percent_decode};

// ========================================
// Strategy 定義
// ========================================

#[derive(Debug, Clone)]
struct UrlParts {
    scheme: String,
    userinfo: Option<(String, Option<String>)>,
    host: String,
    port: Option<u16>,
    path: Vec<String>,
    trailing_slash: bool,
    query: Vec<(String, String)>,
    fragment: Option<String>,
}

impl UrlParts {
    fn render(&self) -> String {
        let mut s = format!("{}://", self.scheme);
        if let Some((user, pass)) = &self.userinfo {
            s.push_str(user);
            if let Some(pass) = pass {
                s.push(':');
                s.push_str(pass);
            }
            s.push('@');
        }
        s.push_str(&self.host);
        if let Some(port) = self.port {
            s.push_str(&format!(":{}", port));
        }
        if !self.path.is_empty() || self.trailing_slash {
            s.push_str(&join_path(&self.path));
            if self.trailing_slash && !self.path.is_empty() {
                s.push('/');
            }
        }
        if !self.query.is_empty() {
            s.push('?');
            s.push_str(&join_query(&self.query));
        }
        if let Some(fragment) = &self.fragment {
            s.push('#');
            s.push_str(fragment);
        }
        s
    }
}

fn url_parts() -> impl Strategy<Value = UrlParts> {
    (
        scheme(),
        proptest::option::of(("[a-z0-9]{1,6}", proptest::option::of("[a-z0-9]{1,6}"))),
        hostname(),
        proptest::option::of(any::<u16>()),
        path_segments(),
        any::<bool>(),
        query_pairs(),
        proptest::option::of("[A-Za-z0-9]{0,6}"),
    )
        .prop_map(
            |(scheme, userinfo, host, port, path, trailing_slash, query, fragment)| UrlParts {
                scheme,
                userinfo,
                host,
                port,
                path,
                trailing_slash,
                query,
                fragment,
            },
        )
}

// ========================================
// Url::parse
// ========================================

proptest! {
    #[test]
    fn prop_url_components_recovered(parts in url_parts()) {
        let input = parts.render();
        let url = Url::parse(&input).unwrap();

        prop_assert_eq!(url.scheme, Some(parts.scheme.as_str()));
        prop_assert_eq!(url.host, Some(parts.host.as_str()));
        prop_assert_eq!(url.port, parts.port);
        prop_assert_eq!(
            url.username,
            parts.userinfo.as_ref().map(|(u, _)| u.as_str())
        );
        prop_assert_eq!(
            url.password,
            parts.userinfo.as_ref().and_then(|(_, p)| p.as_deref())
        );
        prop_assert_eq!(&url.path, &parts.path);
        let expected_query: Vec<QueryPair> = parts
            .query
            .iter()
            .map(|(k, v)| QueryPair::new(k, v))
            .collect();
        prop_assert_eq!(&url.query, &expected_query);
        prop_assert_eq!(url.fragment, parts.fragment.as_deref());
    }

    #[test]
    fn prop_url_ipv6_host(
        groups in proptest::collection::vec("[0-9a-f]{1,4}", 2..=8),
        port in proptest::option::of(any::<u16>()),
    ) {
        let host = format!("[{}]", groups.join(":"));
        let input = match port {
            Some(port) => format!("http://{}:{}/", host, port),
            None => format!("http://{}/", host),
        };
        let url = Url::parse(&input).unwrap();
        prop_assert_eq!(url.host, Some(host.as_str()));
        prop_assert_eq!(url.port, port);
    }

    #[test]
    fn prop_url_port_out_of_range_rejected(port in 65536u32..=99999, host in hostname()) {
        let input = format!("http://{}:{}/", host, port);
        prop_assert!(Url::parse(&input).is_err());
    }

    #[test]
    fn prop_url_port_too_many_digits_rejected(port in "[0-9]{6,10}", host in hostname()) {
        let input = format!("http://{}:{}/", host, port);
        prop_assert!(Url::parse(&input).is_err());
    }

    #[test]
    fn prop_url_without_scheme_separator_rejected(host in hostname(), path in path_segments()) {
        let input = format!("{}{}", host, join_path(&path));
        prop_assert!(Url::parse(&input).is_err());
    }

    #[test]
    fn prop_url_parse_never_panics(input in "\\PC{0,64}") {
        let _ = Url::parse(&input);
    }
}

// ========================================
// parse_path_components
// ========================================

proptest! {
    #[test]
    fn prop_path_components(segments in path_segments(), trailing_slash in any::<bool>()) {
        let mut input = join_path(&segments);
        if trailing_slash && !segments.is_empty() {
            input.push('/');
        }
        let parsed = parse_path_components(&input).unwrap();
        prop_assert_eq!(parsed, segments);
    }

    #[test]
    fn prop_path_components_reject_illegal(
        segment in path_segment(),
        illegal in prop::sample::select(vec!['?', ':', '#', ' ', '\t', '\x7f']),
    ) {
        let input = format!("/{}{}", segment, illegal);
        prop_assert!(parse_path_components(&input).is_err());
    }

    #[test]
    fn prop_path_components_require_leading_slash(segments in proptest::collection::vec(path_segment(), 1..=4)) {
        prop_assert!(parse_path_components(&segments.join("/")).is_err());
    }
}

// ========================================
// parse_query
// ========================================

proptest! {
    #[test]
    fn prop_query_pairs(pairs in query_pairs(), extra_separators in proptest::collection::vec(0usize..4, 0..=4)) {
        // 空の要素は読み飛ばされる
        let mut input = String::new();
        for (i, (k, v)) in pairs.iter().enumerate() {
            let separators = extra_separators.get(i).copied().unwrap_or(0);
            input.push_str(&"&".repeat(separators + usize::from(i > 0)));
            input.push_str(&format!("{}={}", k, v));
        }
        input.push_str(&"&".repeat(extra_separators.len()));

        let parsed = parse_query(&input);
        let expected: Vec<QueryPair> = pairs.iter().map(|(k, v)| QueryPair::new(k, v)).collect();
        prop_assert_eq!(parsed, expected);
    }

    #[test]
    fn prop_query_first_equals_splits(key in "[a-z]{1,6}", value in "[a-z=]{0,8}") {
        let input = format!("{}={}", key, value);
        let parsed = parse_query(&input);
        prop_assert_eq!(parsed, vec![QueryPair::new(&key, &value)]);
    }
}

// ========================================
// percent_decode
// ========================================

proptest! {
    #[test]
    fn prop_percent_decode_fully_encoded(s in "\\PC{0,32}") {
        let encoded: String = s.bytes().map(|b| format!("%{:02X}", b)).collect();
        let decoded = percent_decode(&encoded).unwrap();
        prop_assert_eq!(decoded.as_ref(), s.as_str());
    }

    #[test]
    fn prop_percent_decode_borrows_plain(s in "[A-Za-z0-9._~+-]{0,32}") {
        let decoded = percent_decode(&s).unwrap();
        prop_assert!(matches!(decoded, Cow::Borrowed(_)));
        prop_assert_eq!(decoded.as_ref(), s.as_str());
    }

    #[test]
    fn prop_percent_decode_truncated_rejected(s in "[a-z]{0,8}", hex in "[0-9A-F]?") {
        let input = format!("{}%{}", s, hex);
        prop_assert!(percent_decode(&input).is_err());
    }
}
