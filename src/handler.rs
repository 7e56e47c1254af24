use std::fmt;

use crate::Result;

/// Type that handles multipart parser events.
///
/// Every callback defaults to a no-op, so a handler only implements the events
/// it cares about. Returning an error aborts the parse: the error is surfaced
/// from the [`write`](crate::MultipartParser::write) call that triggered it.
///
/// Byte slices are only borrowed for the duration of the call. Copy them if
/// they must outlive it.
#[allow(unused_variables)]
pub trait Handler {
    /// Callback that is executed when a new part has started.
    fn on_part_begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// Callback that is executed when bytes of a header name have been located.
    ///
    /// This may be executed multiple times in order to supply the entire header name.
    fn on_header_field(&mut self, field: &[u8]) -> Result<()> {
        Ok(())
    }

    /// Callback that is executed when bytes of a header value have been located.
    ///
    /// This may be executed multiple times in order to supply the entire header value.
    /// It is not executed at all for an empty value.
    fn on_header_value(&mut self, value: &[u8]) -> Result<()> {
        Ok(())
    }

    /// Callback that is executed when a header line has been completed.
    fn on_header_end(&mut self) -> Result<()> {
        Ok(())
    }

    /// Callback that is executed when the blank line ending the part headers has been located.
    fn on_headers_end(&mut self) -> Result<()> {
        Ok(())
    }

    /// Callback that is executed when part data has been located.
    ///
    /// This may be executed multiple times in order to supply the entire part data.
    fn on_part_data(&mut self, data: &[u8]) -> Result<()> {
        Ok(())
    }

    /// Callback that is executed when the boundary ending the current part has been located.
    fn on_part_end(&mut self) -> Result<()> {
        Ok(())
    }

    /// Callback that is executed when the closing boundary has been located.
    fn on_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Only validates the body.
impl Handler for () {}

impl<H: Handler + ?Sized> Handler for &mut H {
    fn on_part_begin(&mut self) -> Result<()> {
        (**self).on_part_begin()
    }

    fn on_header_field(&mut self, field: &[u8]) -> Result<()> {
        (**self).on_header_field(field)
    }

    fn on_header_value(&mut self, value: &[u8]) -> Result<()> {
        (**self).on_header_value(value)
    }

    fn on_header_end(&mut self) -> Result<()> {
        (**self).on_header_end()
    }

    fn on_headers_end(&mut self) -> Result<()> {
        (**self).on_headers_end()
    }

    fn on_part_data(&mut self, data: &[u8]) -> Result<()> {
        (**self).on_part_data(data)
    }

    fn on_part_end(&mut self) -> Result<()> {
        (**self).on_part_end()
    }

    fn on_end(&mut self) -> Result<()> {
        (**self).on_end()
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn on_part_begin(&mut self) -> Result<()> {
        (**self).on_part_begin()
    }

    fn on_header_field(&mut self, field: &[u8]) -> Result<()> {
        (**self).on_header_field(field)
    }

    fn on_header_value(&mut self, value: &[u8]) -> Result<()> {
        (**self).on_header_value(value)
    }

    fn on_header_end(&mut self) -> Result<()> {
        (**self).on_header_end()
    }

    fn on_headers_end(&mut self) -> Result<()> {
        (**self).on_headers_end()
    }

    fn on_part_data(&mut self, data: &[u8]) -> Result<()> {
        (**self).on_part_data(data)
    }

    fn on_part_end(&mut self) -> Result<()> {
        (**self).on_part_end()
    }

    fn on_end(&mut self) -> Result<()> {
        (**self).on_end()
    }
}

type Notify<'a> = Option<Box<dyn FnMut() + 'a>>;
type Slice<'a> = Option<Box<dyn FnMut(&[u8]) + 'a>>;

/// A set of optional callbacks, one slot per event.
///
/// ```
/// use multipart_parser::{Callbacks, MultipartParser};
///
/// let mut parts = 0;
/// let mut size = 0;
///
/// let callbacks = Callbacks::new()
///     .on_part_begin(|| parts += 1)
///     .on_part_data(|data| size += data.len());
///
/// let mut parser = MultipartParser::new("XYZ", callbacks)?;
/// parser.write(b"--XYZ\r\ncontent-disposition: form-data; name=\"a\"\r\n\r\nhello\r\n--XYZ--\r\n")?;
/// parser.end()?;
/// drop(parser);
///
/// assert_eq!(parts, 1);
/// assert_eq!(size, 5);
/// # Ok::<(), multipart_parser::Error>(())
/// ```
#[derive(Default)]
pub struct Callbacks<'a> {
    part_begin: Notify<'a>,
    header_field: Slice<'a>,
    header_value: Slice<'a>,
    header_end: Notify<'a>,
    headers_end: Notify<'a>,
    part_data: Slice<'a>,
    part_end: Notify<'a>,
    end: Notify<'a>,
}

impl<'a> Callbacks<'a> {
    /// Creates an empty set of callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `part_begin` callback.
    #[must_use]
    pub fn on_part_begin(mut self, f: impl FnMut() + 'a) -> Self {
        self.part_begin.replace(Box::new(f));
        self
    }

    /// Sets the `header_field` callback.
    #[must_use]
    pub fn on_header_field(mut self, f: impl FnMut(&[u8]) + 'a) -> Self {
        self.header_field.replace(Box::new(f));
        self
    }

    /// Sets the `header_value` callback.
    #[must_use]
    pub fn on_header_value(mut self, f: impl FnMut(&[u8]) + 'a) -> Self {
        self.header_value.replace(Box::new(f));
        self
    }

    /// Sets the `header_end` callback.
    #[must_use]
    pub fn on_header_end(mut self, f: impl FnMut() + 'a) -> Self {
        self.header_end.replace(Box::new(f));
        self
    }

    /// Sets the `headers_end` callback.
    #[must_use]
    pub fn on_headers_end(mut self, f: impl FnMut() + 'a) -> Self {
        self.headers_end.replace(Box::new(f));
        self
    }

    /// Sets the `part_data` callback.
    #[must_use]
    pub fn on_part_data(mut self, f: impl FnMut(&[u8]) + 'a) -> Self {
        self.part_data.replace(Box::new(f));
        self
    }

    /// Sets the `part_end` callback.
    #[must_use]
    pub fn on_part_end(mut self, f: impl FnMut() + 'a) -> Self {
        self.part_end.replace(Box::new(f));
        self
    }

    /// Sets the `end` callback.
    #[must_use]
    pub fn on_end(mut self, f: impl FnMut() + 'a) -> Self {
        self.end.replace(Box::new(f));
        self
    }
}

fn notify(slot: &mut Notify<'_>) -> Result<()> {
    if let Some(f) = slot {
        f();
    }
    Ok(())
}

fn slice(slot: &mut Slice<'_>, bytes: &[u8]) -> Result<()> {
    if let Some(f) = slot {
        f(bytes);
    }
    Ok(())
}

impl Handler for Callbacks<'_> {
    fn on_part_begin(&mut self) -> Result<()> {
        notify(&mut self.part_begin)
    }

    fn on_header_field(&mut self, field: &[u8]) -> Result<()> {
        slice(&mut self.header_field, field)
    }

    fn on_header_value(&mut self, value: &[u8]) -> Result<()> {
        slice(&mut self.header_value, value)
    }

    fn on_header_end(&mut self) -> Result<()> {
        notify(&mut self.header_end)
    }

    fn on_headers_end(&mut self) -> Result<()> {
        notify(&mut self.headers_end)
    }

    fn on_part_data(&mut self, data: &[u8]) -> Result<()> {
        slice(&mut self.part_data, data)
    }

    fn on_part_end(&mut self) -> Result<()> {
        notify(&mut self.part_end)
    }

    fn on_end(&mut self) -> Result<()> {
        notify(&mut self.end)
    }
}

impl fmt::Debug for Callbacks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("part_begin", &self.part_begin.is_some())
            .field("header_field", &self.header_field.is_some())
            .field("header_value", &self.header_value.is_some())
            .field("header_end", &self.header_end.is_some())
            .field("headers_end", &self.headers_end.is_some())
            .field("part_data", &self.part_data.is_some())
            .field("part_end", &self.part_end.is_some())
            .field("end", &self.end.is_some())
            .finish()
    }
}
