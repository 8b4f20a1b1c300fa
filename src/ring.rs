//! 固定容量のリングバッファ
//!
//! ソケットやファイルから断片的に届くバイト列と、HTTP / URL パーサーとの間に置く
//! 唯一の中間バッファ。パースに関する知識は持たない。
//!
//! ## 不変条件
//!
//! - `held <= capacity`
//! - `can_read_count() + can_write_count() == capacity()`
//! - 書き込み位置は `(read + held) % capacity` で求める
//!
//! 読み取り位置と書き込み位置が一致する状態は「空」と「満杯」の両方で起こるため、
//! 保持バイト数 `held` で区別する。予約スロットは無く、容量すべてを使える。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_ringhttp::RingBuffer;
//!
//! let mut ring = RingBuffer::new(8);
//! assert_eq!(ring.write_bytes(b"hello world"), 8);
//! assert!(ring.is_full());
//!
//! let mut out = [0u8; 5];
//! assert_eq!(ring.read_bytes(&mut out), 5);
//! assert_eq!(&out, b"hello");
//! assert_eq!(ring.can_write_count(), 5);
//! ```

/// 固定容量のリングバッファ
///
/// 書き込みも読み取りも失敗しない。入り切らない分は単に転送されず、
/// 戻り値のバイト数で呼び出し側に伝える (Unix パイプの部分 I/O と同じ契約)。
pub struct RingBuffer {
    storage: Box<[u8]>,
    read: usize,
    held: usize,
}

impl RingBuffer {
    /// 容量 `capacity` のリングバッファを作成
    ///
    /// `capacity == 0` も許可する。その場合は常に空かつ満杯で、
    /// すべての転送は 0 バイトになる。
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            read: 0,
            held: 0,
        }
    }

    /// 容量を取得
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// 読み取り可能なバイト数
    pub fn can_read_count(&self) -> usize {
        self.held
    }

    /// 書き込み可能なバイト数
    pub fn can_write_count(&self) -> usize {
        self.storage.len() - self.held
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.held == 0
    }

    /// 満杯かどうか
    pub fn is_full(&self) -> bool {
        self.held == self.storage.len()
    }

    fn write_pos(&self) -> usize {
        let cap = self.storage.len();
        if cap == 0 {
            0
        } else {
            (self.read + self.held) % cap
        }
    }

    /// `src` を書き込み、書き込めたバイト数を返す
    ///
    /// 書き込むのは `min(can_write_count(), src.len())` バイト。
    /// 末尾で折り返す場合はバッファ末尾、先頭の順に最大 2 回コピーする。
    pub fn write_bytes(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.can_write_count());
        if n == 0 {
            return 0;
        }
        let cap = self.storage.len();
        let tail = self.write_pos();
        let first = (cap - tail).min(n);
        self.storage[tail..tail + first].copy_from_slice(&src[..first]);
        if n > first {
            self.storage[..n - first].copy_from_slice(&src[first..n]);
        }
        self.held += n;
        n
    }

    /// `dst` に読み取り、読み取れたバイト数を返す
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> usize {
        let n = self.peek_bytes(dst);
        self.advance(n);
        n
    }

    /// 読み取り位置を進めずに `dst` へコピーする
    pub fn peek_bytes(&self, dst: &mut [u8]) -> usize {
        let (a, b) = self.as_slices();
        let first = a.len().min(dst.len());
        dst[..first].copy_from_slice(&a[..first]);
        let second = b.len().min(dst.len() - first);
        dst[first..first + second].copy_from_slice(&b[..second]);
        first + second
    }

    /// 最大 `n` バイトを読み捨て、捨てたバイト数を返す
    pub fn consume(&mut self, n: usize) -> usize {
        let n = n.min(self.held);
        self.advance(n);
        n
    }

    /// 読み取り可能なデータをすべて破棄
    pub fn clear(&mut self) {
        self.read = 0;
        self.held = 0;
    }

    /// 読み取り可能なデータを順番どおり最大 2 つのスライスで返す
    ///
    /// 2 つ目のスライスは折り返した残りで、空の場合がある。
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        if self.held == 0 {
            return (&[], &[]);
        }
        let cap = self.storage.len();
        if self.held <= cap - self.read {
            (&self.storage[self.read..self.read + self.held], &[])
        } else {
            let first = cap - self.read;
            (
                &self.storage[self.read..],
                &self.storage[..self.held - first],
            )
        }
    }

    /// 読み取り可能なデータを 1 つの連続したスライスにする
    ///
    /// 折り返している場合のみバッファを回転させる。バイト列の順序は変わらない。
    pub fn make_contiguous(&mut self) -> &[u8] {
        let cap = self.storage.len();
        if self.held > 0 && self.read + self.held > cap {
            self.storage.rotate_left(self.read);
            self.read = 0;
        }
        &self.storage[self.read..self.read + self.held]
    }

    /// 先頭の `n` バイトを連続したスライスとして取り出し、読み取り位置をその直後へ進める
    ///
    /// 返したスライスは次の書き込みまで有効で、借用がそれを保証する。
    pub(crate) fn take_contiguous(&mut self, n: usize) -> &[u8] {
        let n = n.min(self.held);
        self.make_contiguous();
        let start = self.read;
        self.advance(n);
        &self.storage[start..start + n]
    }

    /// 次の書き込み位置から始まる連続した空き領域
    ///
    /// 折り返しがあるため、空き容量全体より短い場合がある。
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        let cap = self.storage.len();
        if self.held == cap {
            return &mut [];
        }
        let tail = self.write_pos();
        let end = if tail >= self.read && !(tail == self.read && self.held > 0) {
            // 空き領域は tail..cap と 0..read に分かれる
            cap
        } else {
            self.read
        };
        &mut self.storage[tail..end]
    }

    /// `spare_mut()` に書き込んだ `n` バイトを確定する
    pub(crate) fn commit(&mut self, n: usize) {
        debug_assert!(n <= self.can_write_count());
        self.held += n.min(self.can_write_count());
    }

    fn advance(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.held -= n;
        if self.held == 0 {
            self.read = 0;
        } else {
            self.read = (self.read + n) % self.storage.len();
        }
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("read", &self.read)
            .field("held", &self.held)
            .finish()
    }
}
