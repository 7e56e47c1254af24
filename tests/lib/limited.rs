use std::fmt;
use std::io::{self, Read};

use rand::Rng;

/// Reader yielding at most `limit` bytes per read.
pub struct Limited<T> {
    io: T,
    limit: usize,
    length: u64,
    eof: bool,
}

impl<T> Limited<T> {
    pub fn new(io: T, limit: usize) -> Self {
        Self {
            io,
            limit,
            length: 0,
            eof: false,
        }
    }

    pub fn random(io: T) -> Self {
        Self::random_with(io, 8 * 1024)
    }

    pub fn random_with(io: T, max: usize) -> Self {
        let limit = rand::thread_rng().gen_range(1..=max);

        tracing::info!("Limited stream by {}", limit);

        Self::new(io, limit)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> u64 {
        self.length
    }
}

impl<T> fmt::Debug for Limited<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Limited")
            .field("eof", &self.eof)
            .field("limit", &self.limit)
            .field("length", &self.length)
            .finish()
    }
}

impl<T: Read> Read for Limited<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let max = buf.len().min(self.limit);
        let n = self.io.read(&mut buf[..max])?;
        if n == 0 {
            self.eof = true;
        }
        self.length += n as u64;
        Ok(n)
    }
}
