/// Capacity of the proc buffer module's store, terminator included.
pub const PROC_BUFFER_SIZE: usize = 256;

/// A fixed-capacity, NUL-terminated byte string.
///
/// Holds at most `N - 1` bytes. The byte after the content is always `0`.
#[derive(Clone)]
pub struct StringBuffer<const N: usize = PROC_BUFFER_SIZE> {
    data: [u8; N],
    len: usize,
}

impl<const N: usize> StringBuffer<N> {
    /// Largest number of bytes [`store`](Self::store) keeps.
    pub const CAPACITY: usize = N - 1;

    pub const fn new() -> Self {
        StringBuffer {
            data: [0; N],
            len: 0,
        }
    }

    /// Replaces the content with the first [`CAPACITY`](Self::CAPACITY) bytes of `bytes`.
    ///
    /// Returns how many bytes were kept.
    pub fn store(&mut self, bytes: &[u8]) -> usize {
        let len = bytes.len().min(Self::CAPACITY);
        self.data[..len].copy_from_slice(&bytes[..len]);
        self.data[len..].fill(0);
        self.len = len;
        len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.data[..=self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for StringBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for StringBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StringBuffer")
            .field("data", &core::str::from_utf8(self.as_bytes()))
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let buf = StringBuffer::<PROC_BUFFER_SIZE>::new();
        assert!(buf.is_empty());
        assert_eq!(buf.as_bytes(), b"");
        assert_eq!(buf.as_bytes_with_nul(), b"\0");
    }

    #[test]
    fn short_write_reads_back_verbatim() {
        let mut buf = StringBuffer::<PROC_BUFFER_SIZE>::new();
        assert_eq!(buf.store(b"hi there\n"), 9);
        assert_eq!(buf.as_bytes(), b"hi there\n");
        assert_eq!(buf.as_bytes_with_nul().last(), Some(&0));
    }

    #[test]
    fn long_write_keeps_capacity_prefix() {
        let mut buf = StringBuffer::<PROC_BUFFER_SIZE>::new();
        let input = [b'a'; 300];
        assert_eq!(buf.store(&input), 255);
        assert_eq!(buf.as_bytes(), &input[..255]);
        assert_eq!(buf.len(), StringBuffer::<PROC_BUFFER_SIZE>::CAPACITY);
    }

    #[test]
    fn exact_capacity_fits() {
        let mut buf = StringBuffer::<8>::new();
        assert_eq!(buf.store(b"1234567"), 7);
        assert_eq!(buf.as_bytes_with_nul(), b"1234567\0");
        assert_eq!(buf.store(b"12345678"), 7);
        assert_eq!(buf.as_bytes(), b"1234567");
    }

    #[test]
    fn last_write_wins() {
        let mut buf = StringBuffer::<PROC_BUFFER_SIZE>::new();
        buf.store(b"a much longer first value");
        buf.store(b"short");
        assert_eq!(buf.as_bytes(), b"short");
        assert_eq!(buf.as_bytes_with_nul(), b"short\0");
        buf.store(b"");
        assert!(buf.is_empty());
    }
}
