use std::io::{self, ErrorKind, Read, Write};

use tracing::trace;

use crate::{Error, Handler, MultipartParser, Result};

impl<H: Handler> MultipartParser<H> {
    /// Reads the whole body from a reader, then signals the end of stream.
    ///
    /// Reads by `limits.buffer_size`, returns the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// IO errors of the reader and any parser error.
    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<u64> {
        let mut buf = vec![0; self.limits().buffer_size];

        loop {
            trace!("polling data from reader");

            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            self.write(&buf[..n])?;
        }

        self.end()?;
        Ok(self.len())
    }
}

/// Writes bytes into the parser, so `std::io::copy` can drive it.
///
/// The end of stream still has to be signaled with [`MultipartParser::end`].
impl<H: Handler> Write for MultipartParser<H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        MultipartParser::write(self, buf).map_err(|e| match e {
            Error::Stream(e) => e,
            e => io::Error::new(ErrorKind::InvalidData, e),
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
