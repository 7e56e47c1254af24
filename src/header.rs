use bytes::{Bytes, BytesMut};
use http::header::{HeaderName, HeaderValue};

use crate::{Error, Result};

/// Reassembles a header line from the `header_field` and `header_value` fragments.
///
/// ```
/// use multipart_parser::PendingHeader;
///
/// let mut header = PendingHeader::default();
/// header.push_name(b"Content-");
/// header.push_name(b"Type");
/// header.push_value(b"text/");
/// header.push_value(b"plain");
///
/// let (name, value) = header.take()?;
/// assert_eq!(name, http::header::CONTENT_TYPE);
/// assert_eq!(value, "text/plain");
/// assert!(header.is_empty());
/// # Ok::<(), multipart_parser::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct PendingHeader {
    name: BytesMut,
    value: BytesMut,
}

impl PendingHeader {
    /// Appends bytes of the name.
    pub fn push_name(&mut self, bytes: &[u8]) {
        self.name.extend_from_slice(bytes);
    }

    /// Appends bytes of the value.
    pub fn push_value(&mut self, bytes: &[u8]) {
        self.value.extend_from_slice(bytes);
    }

    /// Gets the name collected so far.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Gets the value collected so far.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Checks if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.value.is_empty()
    }

    /// Takes the raw name and value as seen on the wire, clearing the header.
    pub fn take_raw(&mut self) -> (Bytes, Bytes) {
        (self.name.split().freeze(), self.value.split().freeze())
    }

    /// Takes the name and value as `http` types, clearing the header.
    ///
    /// The name is lowercased by [`HeaderName`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHeader`] if the name or the value is not valid.
    pub fn take(&mut self) -> Result<(HeaderName, HeaderValue)> {
        let (name, value) = self.take_raw();
        Ok((
            HeaderName::from_bytes(&name).map_err(|_| Error::InvalidHeader)?,
            HeaderValue::from_maybe_shared(value).map_err(|_| Error::InvalidHeader)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments() {
        let mut header = PendingHeader::default();
        assert!(header.is_empty());

        header.push_name(b"Content-");
        assert_eq!(header.name(), b"Content-");
        assert!(header.value().is_empty());

        header.push_name(b"Length");
        header.push_value(b"1");
        header.push_value(b"3");
        assert_eq!(header.name(), b"Content-Length");
        assert_eq!(header.value(), b"13");

        let (name, value) = header.take().unwrap();
        assert_eq!(name, http::header::CONTENT_LENGTH);
        assert_eq!(value, "13");
        assert!(header.name().is_empty());
        assert!(header.value().is_empty());
    }

    #[test]
    fn take_raw_keeps_case() {
        let mut header = PendingHeader::default();
        header.push_name(b"X-Custom");
        header.push_value(b" Mixed Case ");

        let (name, value) = header.take_raw();
        assert_eq!(name, "X-Custom");
        assert_eq!(value, " Mixed Case ");
        assert!(header.is_empty());
    }

    #[test]
    fn take_empty_value() {
        let mut header = PendingHeader::default();
        header.push_name(b"X-Empty");

        let (name, value) = header.take().unwrap();
        assert_eq!(name.as_str(), "x-empty");
        assert!(value.is_empty());
    }

    #[test]
    fn take_invalid_value() {
        let mut header = PendingHeader::default();
        header.push_name(b"X-Bad");
        header.push_value(b"a\0b");

        assert!(matches!(header.take(), Err(Error::InvalidHeader)));
        assert!(header.is_empty());
    }
}
