use std::fmt;

use tracing::{debug, trace};

use crate::{
    boundary::Delimiter,
    utils::{is_token, COLON, CR, CRLF, HYPHEN, LF, SPACE, TAB},
    Error, Handler, Limits, Result,
};

/// Position of the parser within the multipart grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Nothing has been consumed yet.
    Start,
    /// Matching the opening `--boundary`.
    StartBoundary,
    /// A boundary has been matched, expecting `\r\n` or `--`.
    AfterBoundary,
    /// `\r` after a boundary, expecting `\n`.
    BoundaryAlmostDone,
    /// `-` after a boundary, expecting `-`.
    CloseBoundary,
    /// At the beginning of a header line.
    HeaderFieldStart,
    /// Inside a header name.
    HeaderField,
    /// After the `:` of a header line.
    HeaderValueStart,
    /// Inside a header value.
    HeaderValue,
    /// `\r` after a header value, expecting `\n`.
    HeaderValueAlmostDone,
    /// `\r` on an empty line, expecting `\n`.
    HeadersAlmostDone,
    /// Headers are done, part data starts with the next byte.
    PartDataStart,
    /// Inside part data.
    PartData,
    /// The closing boundary has been matched.
    End,
}

/// Bookkeeping for the part between `part_begin` and `part_end`, never its payload.
#[derive(Debug)]
struct PartContext {
    index: usize,
    headers: usize,
    header_size: usize,
    length: u64,
}

/// Incremental `multipart/form-data` parser.
///
/// Bytes are pushed with [`write`](Self::write) in chunks of any size and any
/// alignment; events are delivered synchronously to the [`Handler`] while the
/// chunk is processed. Payload is never buffered: apart from its
/// configuration, the parser only remembers how many bytes at the tail of the
/// previous chunk matched the start of the delimiter.
///
/// # Examples
///
/// ```
/// use multipart_parser::{Handler, MultipartParser, Result};
///
/// #[derive(Default)]
/// struct Sizes(Vec<usize>);
///
/// impl Handler for Sizes {
///     fn on_part_begin(&mut self) -> Result<()> {
///         self.0.push(0);
///         Ok(())
///     }
///
///     fn on_part_data(&mut self, data: &[u8]) -> Result<()> {
///         if let Some(size) = self.0.last_mut() {
///             *size += data.len();
///         }
///         Ok(())
///     }
/// }
///
/// let body = b"--XYZ\r\ncontent-disposition: form-data; name=\"a\"\r\n\r\nhello\r\n--XYZ--\r\n";
///
/// let mut parser = MultipartParser::new("XYZ", Sizes::default())?;
/// for chunk in body.chunks(3) {
///     parser.write(chunk)?;
/// }
/// parser.end()?;
///
/// assert_eq!(parser.handler().0, [5]);
/// # Ok::<(), multipart_parser::Error>(())
/// ```
pub struct MultipartParser<H> {
    handler: H,
    limits: Limits,
    delimiter: Delimiter,
    state: ParserState,
    // progress through `--boundary` at the start, or the `\r\n` after the closing boundary
    index: usize,
    // delimiter bytes matched at the tail of the previous chunk
    matched: usize,
    part: Option<PartContext>,
    total: usize,
    length: u64,
    poisoned: bool,
}

impl<H> MultipartParser<H> {
    /// Gets the current state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Gets the boundary.
    pub fn boundary(&self) -> &[u8] {
        self.delimiter.boundary()
    }

    /// Gets the number of bytes consumed so far.
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Checks if no bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Counts the parts which have begun.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Gets the number of delimiter bytes held back from the previous chunk.
    ///
    /// Always smaller than the delimiter, `\r\n--boundary`.
    pub fn lookbehind(&self) -> usize {
        self.matched
    }

    /// Checks if the closing boundary has been seen.
    pub fn is_finished(&self) -> bool {
        self.state == ParserState::End
    }

    /// Gets the limits.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Gets the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Gets the mutable handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consumes the parser, returning the handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    fn offset(&self, i: usize) -> u64 {
        self.length + i as u64
    }

    fn malformed(&self, i: usize, byte: u8) -> Error {
        Error::MalformedHeaderSyntax {
            offset: self.offset(i),
            byte,
        }
    }
}

impl<H: Handler> MultipartParser<H> {
    /// Creates a new parser, only the body grammar is enforced.
    ///
    /// Uses [`Limits::unlimited`]: no cap on the stream size, parts or part
    /// headers. Caps are opt-in through [`with_limits`](Self::with_limits).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBoundary`] if the boundary is empty or longer than 70 bytes.
    pub fn new<B: AsRef<[u8]>>(boundary: B, handler: H) -> Result<Self> {
        Self::with_limits(boundary, handler, Limits::unlimited())
    }

    /// Creates a new parser.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBoundary`] if the boundary is empty or longer than `limits.boundary_size`.
    pub fn with_limits<B: AsRef<[u8]>>(boundary: B, handler: H, limits: Limits) -> Result<Self> {
        let boundary = boundary.as_ref();

        if boundary.is_empty() || limits.checked_boundary_size(boundary.len()).is_some() {
            return Err(Error::InvalidBoundary);
        }

        Ok(Self {
            handler,
            limits,
            delimiter: Delimiter::new(boundary),
            state: ParserState::Start,
            index: 0,
            matched: 0,
            part: None,
            total: 0,
            length: 0,
            poisoned: false,
        })
    }

    /// Parses a chunk, returns the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Grammar violations, exceeded limits and handler errors. After an error the
    /// parser is unusable and every call returns [`Error::Poisoned`].
    pub fn write(&mut self, chunk: &[u8]) -> Result<usize> {
        if self.poisoned {
            return Err(Error::Poisoned);
        }

        let length = self.length + chunk.len() as u64;
        let res = match self.limits.checked_stream_size(length) {
            Some(max) => Err(Error::PayloadTooLarge(max)),
            None => self.execute(chunk),
        };

        match res {
            Ok(()) => {
                self.length = length;
                Ok(chunk.len())
            }
            Err(e) => {
                debug!(state = ?self.state, "multipart parser failed: {}", e);
                self.poisoned = true;
                Err(e)
            }
        }
    }

    /// Signals that no more bytes will arrive.
    ///
    /// # Errors
    ///
    /// [`Error::UnexpectedEndOfStream`] if the closing boundary has not been seen.
    pub fn end(&mut self) -> Result<()> {
        if self.poisoned {
            return Err(Error::Poisoned);
        }

        if self.state == ParserState::End {
            return Ok(());
        }

        debug!(state = ?self.state, "multipart stream is truncated");
        self.poisoned = true;
        Err(Error::UnexpectedEndOfStream)
    }

    fn execute(&mut self, data: &[u8]) -> Result<()> {
        let len = data.len();
        let mut i = 0;
        // header name or value bytes of this chunk not yet emitted
        let mut mark = matches!(
            self.state,
            ParserState::HeaderField | ParserState::HeaderValue
        )
        .then_some(0);

        while i < len {
            let c = data[i];

            match self.state {
                ParserState::Start => {
                    self.index = 0;
                    self.state = ParserState::StartBoundary;
                }
                ParserState::StartBoundary => {
                    let dashed = self.delimiter.dashed();
                    if c != dashed[self.index] {
                        return Err(Error::BoundaryMismatch(self.offset(i)));
                    }
                    self.index += 1;
                    i += 1;
                    if self.index == dashed.len() {
                        self.index = 0;
                        self.state = ParserState::AfterBoundary;
                    }
                }
                ParserState::AfterBoundary => match c {
                    CR => {
                        i += 1;
                        self.state = ParserState::BoundaryAlmostDone;
                    }
                    HYPHEN => {
                        i += 1;
                        self.state = ParserState::CloseBoundary;
                    }
                    _ => self.not_a_boundary(&[], i)?,
                },
                ParserState::BoundaryAlmostDone => {
                    if c != LF {
                        self.not_a_boundary(&[CR], i)?;
                        continue;
                    }
                    i += 1;
                    self.end_part()?;
                    self.begin_part()?;
                    self.state = ParserState::HeaderFieldStart;
                }
                ParserState::CloseBoundary => {
                    if c != HYPHEN {
                        self.not_a_boundary(&[HYPHEN], i)?;
                        continue;
                    }
                    i += 1;
                    self.end_part()?;
                    trace!(parts = self.total, "closing boundary");
                    self.index = 0;
                    self.state = ParserState::End;
                    self.handler.on_end()?;
                }
                ParserState::HeaderFieldStart => {
                    if c == CR {
                        i += 1;
                        self.state = ParserState::HeadersAlmostDone;
                    } else if is_token(c) {
                        mark = Some(i);
                        self.state = ParserState::HeaderField;
                    } else {
                        return Err(self.malformed(i, c));
                    }
                }
                ParserState::HeaderField => {
                    let rest = &data[i..];
                    let n = rest
                        .iter()
                        .position(|b| !is_token(*b))
                        .unwrap_or(rest.len());
                    self.header_bytes(n)?;
                    i += n;

                    if i == len {
                        break;
                    }
                    if data[i] != COLON {
                        return Err(self.malformed(i, data[i]));
                    }
                    if let Some(m) = mark.take().filter(|m| *m < i) {
                        self.handler.on_header_field(&data[m..i])?;
                    }
                    self.header_bytes(1)?;
                    i += 1;
                    self.state = ParserState::HeaderValueStart;
                }
                ParserState::HeaderValueStart => match c {
                    SPACE | TAB => {
                        self.header_bytes(1)?;
                        i += 1;
                    }
                    CR => {
                        i += 1;
                        self.state = ParserState::HeaderValueAlmostDone;
                    }
                    LF => return Err(self.malformed(i, c)),
                    _ => {
                        mark = Some(i);
                        self.state = ParserState::HeaderValue;
                    }
                },
                ParserState::HeaderValue => {
                    let rest = &data[i..];
                    let Some(n) = memchr::memchr2(CR, LF, rest) else {
                        self.header_bytes(rest.len())?;
                        break;
                    };
                    self.header_bytes(n)?;
                    i += n;

                    if data[i] == LF {
                        return Err(self.malformed(i, LF));
                    }
                    if let Some(m) = mark.take().filter(|m| *m < i) {
                        self.handler.on_header_value(&data[m..i])?;
                    }
                    i += 1;
                    self.state = ParserState::HeaderValueAlmostDone;
                }
                ParserState::HeaderValueAlmostDone => {
                    if c != LF {
                        return Err(self.malformed(i, c));
                    }
                    i += 1;
                    self.end_header()?;
                    self.state = ParserState::HeaderFieldStart;
                }
                ParserState::HeadersAlmostDone => {
                    if c != LF {
                        return Err(self.malformed(i, c));
                    }
                    i += 1;
                    trace!(
                        index = ?self.part.as_ref().map(|p| p.index),
                        "part headers parsed"
                    );
                    self.state = ParserState::PartDataStart;
                    self.handler.on_headers_end()?;
                }
                ParserState::PartDataStart => {
                    self.matched = 0;
                    self.state = ParserState::PartData;
                }
                ParserState::PartData => {
                    i = self.part_data(data, i)?;
                }
                ParserState::End => {
                    if self.index < CRLF.len() && c == CRLF[self.index] {
                        self.index += 1;
                        i += 1;
                    } else {
                        return Err(Error::TrailingData(self.offset(i)));
                    }
                }
            }
        }

        // the header line continues in the next chunk
        if let Some(m) = mark.filter(|m| *m < len) {
            match self.state {
                ParserState::HeaderField => self.handler.on_header_field(&data[m..])?,
                ParserState::HeaderValue => self.handler.on_header_value(&data[m..])?,
                _ => {}
            }
        }

        Ok(())
    }

    /// Scans part data from `i`, returns where scanning stopped.
    fn part_data(&mut self, data: &[u8], mut i: usize) -> Result<usize> {
        let size = self.delimiter.len();

        // resumes a match carried over from the previous chunk
        while self.matched > 0 && i < data.len() {
            if !self.feed_delimiter(data[i])? {
                break;
            }
            i += 1;
            if self.matched == size {
                self.matched = 0;
                self.state = ParserState::AfterBoundary;
                return Ok(i);
            }
        }

        if self.matched > 0 {
            return Ok(i);
        }

        let rest = &data[i..];
        match self.delimiter.find(rest) {
            Some(n) => {
                emit_data(&mut self.handler, &mut self.part, &rest[..n])?;
                self.state = ParserState::AfterBoundary;
                Ok(i + n + size)
            }
            None => {
                let n = self.delimiter.partial_suffix(rest).unwrap_or(rest.len());
                emit_data(&mut self.handler, &mut self.part, &rest[..n])?;
                self.matched = rest.len() - n;
                Ok(data.len())
            }
        }
    }

    /// Feeds a byte to the pending delimiter match.
    ///
    /// Bytes falling out of the match are emitted as part data. Returns `false`
    /// if the byte does not extend the match, `matched` is then zero.
    fn feed_delimiter(&mut self, byte: u8) -> Result<bool> {
        let delimiter = self.delimiter.as_bytes();

        while self.matched > 0 && delimiter[self.matched] != byte {
            let keep = self.delimiter.fallback(self.matched);
            emit_data(
                &mut self.handler,
                &mut self.part,
                &delimiter[..self.matched - keep],
            )?;
            self.matched = keep;
        }

        if delimiter[self.matched] == byte {
            self.matched += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// A matched delimiter is not followed by `\r\n` or `--`.
    ///
    /// Inside a part the delimiter and `tail` are payload, scanning resumes with
    /// the byte at `i`. Before the first part this is a boundary mismatch.
    fn not_a_boundary(&mut self, tail: &'static [u8], i: usize) -> Result<()> {
        if self.part.is_none() {
            return Err(Error::BoundaryMismatch(self.offset(i)));
        }

        trace!("delimiter without `\\r\\n` or `--`, treated as part data");

        let size = self.delimiter.len();
        let keep = self.delimiter.fallback(size);
        emit_data(
            &mut self.handler,
            &mut self.part,
            &self.delimiter.as_bytes()[..size - keep],
        )?;
        self.matched = keep;
        self.state = ParserState::PartData;

        for &b in tail {
            if !self.feed_delimiter(b)? {
                emit_data(&mut self.handler, &mut self.part, &[b])?;
            }
        }

        if self.matched == size {
            self.matched = 0;
            self.state = ParserState::AfterBoundary;
        }

        Ok(())
    }

    fn begin_part(&mut self) -> Result<()> {
        if let Some(max) = self.limits.checked_parts(self.total + 1) {
            return Err(Error::PartsTooMany(max));
        }

        trace!(index = self.total, "part begin");

        self.part.replace(PartContext {
            index: self.total,
            headers: 0,
            header_size: 0,
            length: 0,
        });
        self.total += 1;
        self.handler.on_part_begin()
    }

    fn end_part(&mut self) -> Result<()> {
        if let Some(part) = self.part.take() {
            trace!(index = part.index, length = part.length, "part end");
            self.handler.on_part_end()?;
        }
        Ok(())
    }

    fn header_bytes(&mut self, n: usize) -> Result<()> {
        if let Some(part) = self.part.as_mut() {
            part.header_size += n;
            if let Some(max) = self.limits.checked_header_size(part.header_size) {
                return Err(Error::HeaderTooLarge(max));
            }
        }
        Ok(())
    }

    fn end_header(&mut self) -> Result<()> {
        if let Some(part) = self.part.as_mut() {
            part.header_size = 0;
            part.headers += 1;
            if let Some(max) = self.limits.checked_headers(part.headers) {
                return Err(Error::HeadersTooMany(max));
            }
        }
        self.handler.on_header_end()
    }
}

fn emit_data<H: Handler>(handler: &mut H, part: &mut Option<PartContext>, data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    if let Some(part) = part {
        part.length += data.len() as u64;
    }
    handler.on_part_data(data)
}

impl<H> fmt::Debug for MultipartParser<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultipartParser")
            .field("state", &self.state)
            .field("total", &self.total)
            .field("length", &self.length)
            .field("lookbehind", &self.matched)
            .field("poisoned", &self.poisoned)
            .field("boundary", &String::from_utf8_lossy(self.boundary()))
            .finish()
    }
}
