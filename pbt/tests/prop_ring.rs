//! RingBuffer のプロパティテスト (ring.rs)

use std::collections::VecDeque;

use proptest::prelude::*;
use shiguredo_ringhttp::RingBuffer;

// ========================================
// Strategy 定義
// ========================================

#[derive(Debug, Clone)]
enum Op {
    Write(Vec<u8>),
    Read(usize),
    Peek(usize),
    Consume(usize),
    MakeContiguous,
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => proptest::collection::vec(any::<u8>(), 0..64).prop_map(Op::Write),
        4 => (0usize..64).prop_map(Op::Read),
        1 => (0usize..64).prop_map(Op::Peek),
        1 => (0usize..64).prop_map(Op::Consume),
        1 => Just(Op::MakeContiguous),
        1 => Just(Op::Clear),
    ]
}

fn contents(ring: &RingBuffer) -> Vec<u8> {
    let (a, b) = ring.as_slices();
    [a, b].concat()
}

// ========================================
// VecDeque モデルとの比較
// ========================================

proptest! {
    #[test]
    fn prop_ring_matches_vecdeque(capacity in 0usize..48, ops in proptest::collection::vec(op(), 0..64)) {
        let mut ring = RingBuffer::new(capacity);
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                Op::Write(data) => {
                    let n = ring.write_bytes(&data);
                    let expected = data.len().min(capacity - model.len());
                    prop_assert_eq!(n, expected);
                    model.extend(&data[..n]);
                }
                Op::Read(len) => {
                    let mut buf = vec![0u8; len];
                    let n = ring.read_bytes(&mut buf);
                    let expected: Vec<u8> = model.drain(..len.min(model.len())).collect();
                    prop_assert_eq!(&buf[..n], &expected[..]);
                }
                Op::Peek(len) => {
                    let mut buf = vec![0u8; len];
                    let n = ring.peek_bytes(&mut buf);
                    let expected: Vec<u8> = model.iter().take(len).copied().collect();
                    prop_assert_eq!(&buf[..n], &expected[..]);
                }
                Op::Consume(len) => {
                    let n = ring.consume(len);
                    prop_assert_eq!(n, len.min(model.len()));
                    model.drain(..n);
                }
                Op::MakeContiguous => {
                    let data = ring.make_contiguous().to_vec();
                    prop_assert_eq!(data, model.iter().copied().collect::<Vec<_>>());
                }
                Op::Clear => {
                    ring.clear();
                    model.clear();
                }
            }

            // 容量は常に読み取り可能 + 書き込み可能に等しい
            prop_assert_eq!(ring.can_read_count() + ring.can_write_count(), capacity);
            prop_assert_eq!(ring.can_read_count(), model.len());
            prop_assert_eq!(ring.is_empty(), model.is_empty());
            prop_assert_eq!(ring.is_full(), model.len() == capacity);
            prop_assert_eq!(contents(&ring), model.iter().copied().collect::<Vec<_>>());
        }
    }
}

// ========================================
// 全容量が使えること
// ========================================

proptest! {
    #[test]
    fn prop_ring_full_capacity_usable(capacity in 1usize..256, offset in 0usize..256) {
        let mut ring = RingBuffer::new(capacity);
        // 読み取り位置をずらしてから満杯にする
        let offset = offset % capacity;
        let filler = vec![0xAAu8; offset];
        ring.write_bytes(&filler);
        ring.consume(offset);

        let data: Vec<u8> = (0..capacity).map(|i| i as u8).collect();
        prop_assert_eq!(ring.write_bytes(&data), capacity);
        prop_assert!(ring.is_full());
        prop_assert_eq!(ring.write_bytes(b"x"), 0);

        let mut out = vec![0u8; capacity];
        prop_assert_eq!(ring.read_bytes(&mut out), capacity);
        prop_assert_eq!(out, data);
        prop_assert!(ring.is_empty());
    }
}

// ========================================
// OS パイプとの比較
// ========================================

#[cfg(unix)]
mod pipe_oracle {
    use std::io::{self, PipeReader, PipeWriter, Read, Write};
    use std::os::fd::{AsRawFd, RawFd};

    use super::*;

    /// ディスクリプタをノンブロッキングにする
    fn set_nonblocking(fd: RawFd) {
        // SAFETY: 有効なディスクリプタに対する F_GETFL / F_SETFL
        unsafe {
            let flags = libc::fcntl(fd, libc::F_GETFL);
            assert!(flags >= 0, "F_GETFL failed");
            assert_eq!(libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK), 0);
        }
    }

    fn open_pipe() -> (PipeReader, PipeWriter) {
        let (reader, writer) = std::io::pipe().unwrap();
        // 比較する容量 (最大 4096) と 1 回の書き込み (最大 512) が確実に収まる大きさにする
        #[cfg(target_os = "linux")]
        {
            // SAFETY: 有効なパイプのディスクリプタに対する F_SETPIPE_SZ
            let size = unsafe { libc::fcntl(writer.as_raw_fd(), libc::F_SETPIPE_SZ, 64 * 1024) };
            assert!(size >= 64 * 1024, "F_SETPIPE_SZ failed");
        }
        set_nonblocking(reader.as_raw_fd());
        set_nonblocking(writer.as_raw_fd());
        (reader, writer)
    }

    /// パイプに溜まっているバイト数
    fn pipe_pending(reader: &PipeReader) -> usize {
        let mut n: libc::c_int = 0;
        // SAFETY: 有効なパイプのディスクリプタと c_int へのポインタを渡している
        let ret = unsafe {
            libc::ioctl(
                reader.as_raw_fd(),
                libc::FIONREAD,
                &mut n as *mut libc::c_int,
            )
        };
        assert_eq!(ret, 0, "FIONREAD failed");
        n as usize
    }

    /// WouldBlock は 0 バイトとして扱う
    fn transferred(result: io::Result<usize>) -> usize {
        match result {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => 0,
            Err(e) => panic!("pipe I/O failed: {e}"),
        }
    }

    #[derive(Debug, Clone)]
    enum PipeOp {
        Write(Vec<u8>),
        Read(usize),
    }

    fn pipe_op() -> impl Strategy<Value = PipeOp> {
        prop_oneof![
            proptest::collection::vec(any::<u8>(), 0..512).prop_map(PipeOp::Write),
            (0usize..512).prop_map(PipeOp::Read),
        ]
    }

    proptest! {
        // Linux のパイプはページ単位で管理され、PIPE_BUF 以下の書き込みは分割されない。
        // そのためパイプ自体の容量はバイト単位で合わせられない。
        // パイプ側の書き込み量はパイプ自身の残量 (FIONREAD) と容量から決め、
        // リング側の結果とは独立に比較する。
        #[test]
        fn prop_ring_matches_pipe(capacity in 0usize..=4096, ops in proptest::collection::vec(pipe_op(), 0..48)) {
            let (mut pipe_reader, mut pipe_writer) = open_pipe();
            let mut ring = RingBuffer::new(capacity);

            for op in ops {
                match op {
                    PipeOp::Write(data) => {
                        let space = capacity - pipe_pending(&pipe_reader);
                        let accepted = data.len().min(space);
                        let by_pipe = transferred(pipe_writer.write(&data[..accepted]));
                        let by_ring = ring.write_bytes(&data);
                        prop_assert_eq!(by_ring, by_pipe);
                    }
                    PipeOp::Read(len) => {
                        let mut from_ring = vec![0u8; len];
                        let mut from_pipe = vec![0u8; len];
                        let by_ring = ring.read_bytes(&mut from_ring);
                        let by_pipe = transferred(pipe_reader.read(&mut from_pipe));
                        prop_assert_eq!(by_ring, by_pipe);
                        prop_assert_eq!(&from_ring[..by_ring], &from_pipe[..by_pipe]);
                    }
                }

                let pending = pipe_pending(&pipe_reader);
                prop_assert_eq!(ring.can_read_count(), pending);
                prop_assert_eq!(ring.can_write_count(), capacity - pending);
                prop_assert_eq!(ring.is_empty(), pending == 0);
                prop_assert_eq!(ring.is_full(), pending == capacity);
            }
        }
    }
}
