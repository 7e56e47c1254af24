use futures_util::stream::{Stream, StreamExt};
use tracing::trace;

use crate::{Error, Handler, MultipartParser, Result};

impl<H: Handler> MultipartParser<H> {
    /// Reads the whole body from a stream of chunks, then signals the end of stream.
    ///
    /// Returns the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Errors of the stream and any parser error.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::convert::Infallible;
    ///
    /// use futures_util::stream;
    /// use multipart_parser::{FormData, MultipartParser};
    ///
    /// # async fn run() -> multipart_parser::Result<()> {
    /// let chunks = vec![
    ///     Ok::<_, Infallible>(&b"--XYZ\r\ncontent-disposition: form-data; name=\"a\"\r\n\r\nhel"[..]),
    ///     Ok(&b"lo\r\n--XYZ--\r\n"[..]),
    /// ];
    ///
    /// let mut parser = MultipartParser::new("XYZ", FormData::new())?;
    /// parser.read_stream(stream::iter(chunks)).await?;
    ///
    /// assert_eq!(parser.handler().get("a").map(|f| f.as_bytes()), Some(&b"hello"[..]));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn read_stream<S, B, E>(&mut self, stream: S) -> Result<u64>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Error>,
    {
        futures_util::pin_mut!(stream);

        while let Some(item) = stream.next().await {
            let chunk = item.map_err(Into::into)?;
            trace!("polled {} bytes from stream", chunk.as_ref().len());
            self.write(chunk.as_ref())?;
        }

        self.end()?;
        Ok(self.len())
    }
}
