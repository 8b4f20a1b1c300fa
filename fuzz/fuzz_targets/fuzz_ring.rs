#![no_main]

use std::collections::VecDeque;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shiguredo_ringhttp::RingBuffer;

#[derive(Debug, Arbitrary)]
enum Op {
    Write(Vec<u8>),
    Read(u8),
    Peek(u8),
    Consume(u8),
    MakeContiguous,
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let capacity = usize::from(input.capacity);
    let mut ring = RingBuffer::new(capacity);
    let mut model: VecDeque<u8> = VecDeque::new();

    for op in input.ops {
        match op {
            Op::Write(data) => {
                let n = ring.write_bytes(&data);
                model.extend(&data[..n]);
            }
            Op::Read(len) => {
                let mut buf = vec![0u8; usize::from(len)];
                let n = ring.read_bytes(&mut buf);
                let expected: Vec<u8> = model.drain(..n).collect();
                assert_eq!(&buf[..n], &expected[..]);
            }
            Op::Peek(len) => {
                let mut buf = vec![0u8; usize::from(len)];
                let n = ring.peek_bytes(&mut buf);
                assert!(model.iter().take(n).eq(buf[..n].iter()));
            }
            Op::Consume(len) => {
                let n = ring.consume(usize::from(len));
                model.drain(..n);
            }
            Op::MakeContiguous => {
                assert!(ring.make_contiguous().iter().eq(model.iter()));
            }
            Op::Clear => {
                ring.clear();
                model.clear();
            }
        }

        assert_eq!(ring.can_read_count() + ring.can_write_count(), capacity);
        assert_eq!(ring.can_read_count(), model.len());
    }
});
