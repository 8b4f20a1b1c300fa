//! PBT テスト共通ユーティリティ

use std::collections::VecDeque;
use std::io;

use proptest::prelude::*;
use shiguredo_ringhttp::{ByteSource, ReadStatus};

// ========================================
// トークン / ヘッダー生成
// ========================================

/// tchar のみのトークン (1-16 文字)
pub fn token() -> impl Strategy<Value = String> {
    "[A-Za-z0-9!#$%&'*+.^_`|~-]{1,16}"
}

/// ヘッダー名
pub fn header_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9-]{0,15}"
}

/// ヘッダー値: 前後に空白を持たず、制御文字を含まない (1-32 文字)
pub fn header_value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[!-~]{1,32}",
        "[!-~][ !-~]{0,30}[!-~]",
    ]
}

/// ヘッダーリスト
pub fn headers(max: usize) -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec((header_name(), header_value()), 0..=max)
}

// ========================================
// URL 生成
// ========================================

/// パスセグメント (unreserved のみ)
pub fn path_segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._~-]{1,8}"
}

/// パスセグメント列
pub fn path_segments() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(path_segment(), 0..=5)
}

/// クエリのキーと値
pub fn query_pairs() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec(("[a-z][a-z0-9_]{0,5}", "[A-Za-z0-9._~-]{0,6}"), 0..=4)
}

/// ホスト名
pub fn hostname() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9]{0,9}",
        "[a-z][a-z0-9]{0,9}\\.[a-z]{2,5}",
        "[a-z]{1,5}\\.[a-z]{1,5}\\.[a-z]{2,3}",
    ]
}

/// スキーム
pub fn scheme() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9+.-]{0,7}"
}

/// パスセグメントから "/a/b" を作る (空なら "/")
pub fn join_path(segments: &[String]) -> String {
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// クエリの組から "a=1&b=2" を作る
pub fn join_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

// ========================================
// メッセージ生成
// ========================================

/// メソッド名
pub fn method() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("GET"),
        Just("HEAD"),
        Just("POST"),
        Just("PUT"),
        Just("DELETE"),
        Just("OPTIONS"),
        Just("TRACE"),
        Just("PATCH"),
    ]
}

/// ヘッダーリストを `name: value\r\n` の並びにする
pub fn header_block(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(n, v)| format!("{}: {}\r\n", n, v))
        .collect()
}

/// `bytes` を `cuts` の位置で分割する
///
/// 各要素は入力長で割った余りとして扱う。
pub fn split_at_cuts(bytes: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let mut points: Vec<usize> = cuts.iter().map(|c| c % bytes.len()).collect();
    points.push(0);
    points.push(bytes.len());
    points.sort_unstable();
    points.dedup();
    points
        .windows(2)
        .map(|w| bytes[w[0]..w[1]].to_vec())
        .collect()
}

// ========================================
// テスト用バイトソース
// ========================================

/// 断片を 1 つ返すたびに `Pending` を挟むソース
///
/// 断片を出し切ると `EndOfStream` を返す。
#[derive(Debug)]
pub struct FragmentedSource {
    fragments: VecDeque<Vec<u8>>,
    pending: bool,
}

impl FragmentedSource {
    pub fn new(fragments: Vec<Vec<u8>>) -> Self {
        Self {
            fragments: fragments.into(),
            pending: false,
        }
    }

    /// 残りの断片が無いか
    pub fn is_drained(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl ByteSource for FragmentedSource {
    fn try_read(&mut self, dst: &mut [u8]) -> io::Result<ReadStatus> {
        if self.pending {
            self.pending = false;
            return Ok(ReadStatus::Pending);
        }
        let Some(mut fragment) = self.fragments.pop_front() else {
            return Ok(ReadStatus::EndOfStream);
        };
        let n = fragment.len().min(dst.len());
        dst[..n].copy_from_slice(&fragment[..n]);
        if n < fragment.len() {
            self.fragments.push_front(fragment.split_off(n));
        } else {
            self.pending = true;
        }
        Ok(ReadStatus::Data(n))
    }
}
