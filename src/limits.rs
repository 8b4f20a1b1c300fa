/// `MessageReader::default()` が確保するリングバッファの容量 (16KB)
pub const DEFAULT_BUFFER_CAPACITY: usize = 16 * 1024;

/// リーダーの制限設定
///
/// ヘッダーブロック全体の大きさはリングバッファの容量で制限されるため、
/// ここでは行単位と個数の制限のみを扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderLimits {
    /// 最大ヘッダー数 (デフォルト: 100)
    pub max_headers_count: usize,
    /// 最大ヘッダー行長 (デフォルト: 8KB)
    ///
    /// スタートラインにも適用される。CRLF は含まない。
    pub max_header_line_size: usize,
}

impl Default for ReaderLimits {
    fn default() -> Self {
        Self {
            max_headers_count: 100,
            max_header_line_size: 8 * 1024, // 8KB
        }
    }
}

impl ReaderLimits {
    /// 制限なしの設定を作成
    pub fn unlimited() -> Self {
        Self {
            max_headers_count: usize::MAX,
            max_header_line_size: usize::MAX,
        }
    }
}
