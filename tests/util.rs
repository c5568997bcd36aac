//! Shared canned-byte-stream channel used by the `replay-*.rs` integration tests.

use std::convert::Infallible;

/// A [`ByteChannel`](iec103_master::ByteChannel)-compatible transport backed by a fixed
/// reply buffer, recording every frame written to it for later inspection.
pub struct Replay {
    to_read: std::collections::VecDeque<u8>,
    written: Vec<u8>,
}

impl Replay {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            to_read: bytes.iter().copied().collect(),
            written: Vec::new(),
        }
    }

    #[allow(dead_code)]
    pub fn written(&self) -> &[u8] {
        &self.written
    }
}

impl embedded_io::ErrorType for Replay {
    type Error = Infallible;
}

impl embedded_io::Read for Replay {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut n = 0;

        for slot in buf.iter_mut() {
            match self.to_read.pop_front() {
                Some(b) => {
                    *slot = b;
                    n += 1;
                }
                None => break,
            }
        }

        Ok(n)
    }
}

impl embedded_io::Write for Replay {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }
}
