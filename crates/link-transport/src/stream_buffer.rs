/// A growable byte buffer with a read cursor and a write cursor, used to
/// accumulate partial TCP reads until enough bytes are available to decode
/// a frame.
///
/// Compaction (sliding unread bytes back to offset 0) only happens when more
/// write room is needed AND the space already consumed at the front is at
/// least as large as the data that would have to move — i.e. compaction is
/// never worse than amortized O(1) per byte read. A stream that is read in
/// lockstep with how it's written (the common case) never pays a memmove at
/// all, since `write_pos` stays below capacity and `consume` alone keeps up.
pub struct StreamBuffer {
    buf: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
}

impl StreamBuffer {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            buf: vec![0u8; initial_capacity],
            read_pos: 0,
            write_pos: 0,
        }
    }

    /// Bytes available to decode.
    pub fn unread(&self) -> &[u8] {
        &self.buf[self.read_pos..self.write_pos]
    }

    /// Mark `n` bytes (from the front of [`Self::unread`]) as consumed.
    pub fn consume(&mut self, n: usize) {
        self.read_pos += n;
        debug_assert!(self.read_pos <= self.write_pos);
        if self.read_pos == self.write_pos {
            // Nothing left live; reset cursors for free instead of waiting
            // for the next compaction to notice the buffer is empty.
            self.read_pos = 0;
            self.write_pos = 0;
        }
    }

    /// Total bytes backing the buffer (live + reclaimable + spare).
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Reserve room for at least `additional` more bytes to be written,
    /// compacting or growing as needed, and return the writable tail.
    pub fn reserve_write(&mut self, additional: usize) -> &mut [u8] {
        if self.write_pos + additional > self.buf.len() {
            let unread_len = self.write_pos - self.read_pos;
            if self.read_pos > 0 && self.read_pos >= unread_len {
                self.buf.copy_within(self.read_pos..self.write_pos, 0);
                self.write_pos = unread_len;
                self.read_pos = 0;
            }
            let needed = self.write_pos + additional;
            if needed > self.buf.len() {
                let grown = (self.buf.len() * 2).max(needed);
                self.buf.resize(grown, 0);
            }
        }
        &mut self.buf[self.write_pos..self.write_pos + additional]
    }

    /// Record that `n` bytes were written into the slice returned by the
    /// last [`Self::reserve_write`] call.
    pub fn commit(&mut self, n: usize) {
        self.write_pos += n;
        debug_assert!(self.write_pos <= self.buf.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let mut sb = StreamBuffer::new(16);
        sb.reserve_write(5).copy_from_slice(b"hello");
        sb.commit(5);
        assert_eq!(sb.unread(), b"hello");
        sb.consume(5);
        assert_eq!(sb.unread(), b"");
    }

    #[test]
    fn partial_consume_retains_tail() {
        let mut sb = StreamBuffer::new(16);
        sb.reserve_write(5).copy_from_slice(b"hello");
        sb.commit(5);
        sb.consume(2);
        assert_eq!(sb.unread(), b"llo");
    }

    #[test]
    fn growth_preserves_unread_bytes() {
        let mut sb = StreamBuffer::new(4);
        sb.reserve_write(4).copy_from_slice(b"abcd");
        sb.commit(4);
        sb.reserve_write(4).copy_from_slice(b"efgh");
        sb.commit(4);
        assert_eq!(sb.unread(), b"abcdefgh");
    }

    #[test]
    fn compaction_reclaims_consumed_space_instead_of_growing() {
        let mut sb = StreamBuffer::new(8);
        sb.reserve_write(8).copy_from_slice(b"aaaabbbb");
        sb.commit(8);
        sb.consume(6); // only "bb" remains live
        sb.reserve_write(4).copy_from_slice(b"cccc");
        sb.commit(4);
        assert_eq!(sb.capacity(), 8, "reclaimed space should satisfy the request without growing");
        assert_eq!(sb.unread(), b"bbcccc");
    }

    #[test]
    fn fully_drained_buffer_resets_cursors_for_free() {
        let mut sb = StreamBuffer::new(8);
        sb.reserve_write(8).copy_from_slice(b"12345678");
        sb.commit(8);
        sb.consume(8);
        sb.reserve_write(8).copy_from_slice(b"abcdefgh");
        sb.commit(8);
        assert_eq!(sb.capacity(), 8, "fully drained buffer reuses its capacity without growing");
        assert_eq!(sb.unread(), b"abcdefgh");
    }
}
