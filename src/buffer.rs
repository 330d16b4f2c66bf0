//! Append-only growing byte buffer used while packing a tuple.

/// A growable byte buffer with a reserve-a-window primitive.
///
/// `reserve` is the one operation that doesn't exist on a plain `Vec<u8>`
/// push/`extend_from_slice` API: it hands back a window into the buffer at
/// a fixed offset that the caller fills in place, which is exactly what
/// the versionstamp placeholder needs (§4.5 bakes bytes into that window
/// long after it was reserved).
#[derive(Clone, Debug, Default)]
pub(crate) struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    pub(crate) fn new() -> Self {
        Buffer {
            data: Vec::with_capacity(64),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn append_byte(&mut self, b: u8) {
        self.data.push(b);
    }

    pub(crate) fn append_bytes(&mut self, buf: &[u8]) {
        self.data.extend_from_slice(buf);
    }

    /// Advance the buffer by `n` bytes (zero-filled) and return a mutable
    /// window over them. Any slice returned by a prior call is only valid
    /// until the next mutation of `self`.
    pub(crate) fn reserve(&mut self, n: usize) -> &mut [u8] {
        let start = self.data.len();
        self.data.resize(start + n, 0);
        &mut self.data[start..start + n]
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_finish() {
        let mut buf = Buffer::new();
        buf.append_byte(1);
        buf.append_bytes(&[2, 3, 4]);
        assert_eq!(buf.finish(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn reserve_returns_a_writable_window_at_a_stable_offset() {
        let mut buf = Buffer::new();
        buf.append_byte(0xAA);
        let offset = buf.len();
        {
            let window = buf.reserve(4);
            window.copy_from_slice(&[1, 2, 3, 4]);
        }
        buf.append_byte(0xBB);
        let data = buf.finish();
        assert_eq!(&data[offset..offset + 4], &[1, 2, 3, 4]);
        assert_eq!(data, vec![0xAA, 1, 2, 3, 4, 0xBB]);
    }
}
