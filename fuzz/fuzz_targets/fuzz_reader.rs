#![no_main]

use std::io;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shiguredo_ringhttp::{ByteSource, MessageReader, ReadStatus, ReaderLimits, ReaderState};

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u16,
    max_headers_count: u8,
    max_header_line_size: u16,
    response: bool,
    /// 1 回の読み取りで返す最大バイト数 (0 は Pending)
    chunk_sizes: Vec<u8>,
    data: Vec<u8>,
}

/// 決まった長さずつ返すソース
struct Chunked<'a> {
    data: &'a [u8],
    sizes: std::iter::Cycle<std::vec::IntoIter<u8>>,
}

impl ByteSource for Chunked<'_> {
    fn try_read(&mut self, dst: &mut [u8]) -> io::Result<ReadStatus> {
        if self.data.is_empty() {
            return Ok(ReadStatus::EndOfStream);
        }
        let size = usize::from(self.sizes.next().unwrap_or(u8::MAX));
        if size == 0 {
            return Ok(ReadStatus::Pending);
        }
        let n = size.min(dst.len()).min(self.data.len());
        dst[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(ReadStatus::Data(n))
    }
}

fuzz_target!(|input: Input| {
    let limits = ReaderLimits {
        max_headers_count: usize::from(input.max_headers_count),
        max_header_line_size: usize::from(input.max_header_line_size),
    };
    let mut reader = MessageReader::with_limits(usize::from(input.capacity % 8192), limits);

    let mut sizes = input.chunk_sizes;
    // Pending だけが無限に続かないようにする
    sizes.push(1);
    let mut source = Chunked {
        data: &input.data,
        sizes: sizes.into_iter().cycle(),
    };

    for _ in 0..(input.data.len() * 2 + 16) {
        let result = if input.response {
            reader.read_response(&mut source).map(|r| r.is_some())
        } else {
            reader.read_request(&mut source).map(|r| r.is_some())
        };
        match result {
            Ok(_) => {
                assert!(reader.ring().can_read_count() <= reader.ring().capacity());
            }
            Err(e) => {
                // 失敗は終端状態
                assert_eq!(reader.state(), &ReaderState::Failed(e));
                break;
            }
        }
    }
});
