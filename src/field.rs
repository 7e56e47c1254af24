use std::fmt;

use bytes::Bytes;
use http::HeaderMap;

/// Field
#[derive(Clone, PartialEq)]
pub struct Field {
    /// The payload size of Field.
    pub length: usize,
    /// The index of Field.
    pub index: usize,
    /// The name of Field.
    pub name: String,
    /// The filename of Field, optinal.
    pub filename: Option<String>,
    /// The content_type of Field, optinal.
    pub content_type: Option<mime::Mime>,
    /// The extras headers of Field, optinal.
    pub headers: Option<HeaderMap>,
    pub(crate) data: Bytes,
}

impl Field {
    pub(crate) fn empty() -> Self {
        Self {
            index: 0,
            length: 0,
            name: String::new(),
            filename: None,
            content_type: None,
            headers: None,
            data: Bytes::new(),
        }
    }

    /// Checks if the field is a file, it has a filename.
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    /// Gets field data.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Gets field data, cheaply cloned.
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    /// Consumes the field, returning its data.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("index", &self.index)
            .field("length", &self.length)
            .field("headers", &self.headers)
            .finish()
    }
}
