use bytes::BytesMut;
use http::{
    header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    HeaderMap, HeaderValue,
};
use tracing::trace;

use crate::{
    utils::{parse_content_disposition, parse_content_type},
    Error, Field, Handler, Limits, MultipartParser, PendingHeader, Result,
};

/// Collects parser events into [`Field`]s held in memory.
///
/// Every part must carry a `Content-Disposition: form-data; name="..."` header.
/// Field and file sizes are checked against the [`Limits`] while data arrives.
///
/// ```
/// use multipart_parser::{FormData, Limits};
///
/// let body = "--AaB03x\r\n\
///     Content-Disposition: form-data; name=\"submit-name\"\r\n\r\n\
///     Larry\r\n\
///     --AaB03x\r\n\
///     Content-Disposition: form-data; name=\"files\"; filename=\"file1.txt\"\r\n\
///     Content-Type: text/plain\r\n\r\n\
///     ... contents of file1.txt ...\r\n\
///     --AaB03x--\r\n";
///
/// let form = FormData::parse("AaB03x", body, Limits::default())?;
///
/// assert_eq!(form.len(), 2);
/// assert_eq!(form.get("submit-name").map(|f| f.as_bytes()), Some(&b"Larry"[..]));
/// assert_eq!(form.get("files").and_then(|f| f.filename.as_deref()), Some("file1.txt"));
/// # Ok::<(), multipart_parser::Error>(())
/// ```
#[derive(Debug)]
pub struct FormData {
    limits: Limits,
    fields: Vec<Field>,
    texts: usize,
    files: usize,
    header: PendingHeader,
    headers: HeaderMap,
    current: Option<(Field, BytesMut)>,
}

impl Default for FormData {
    fn default() -> Self {
        Self::with_limits(Limits::default())
    }
}

impl FormData {
    /// Creates a collector with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collector.
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            fields: Vec::new(),
            texts: 0,
            files: 0,
            header: PendingHeader::default(),
            headers: HeaderMap::new(),
            current: None,
        }
    }

    /// Parses a whole body held in memory.
    ///
    /// # Errors
    ///
    /// Any parser or form error, including a truncated body.
    pub fn parse<B, T>(boundary: B, body: T, limits: Limits) -> Result<Self>
    where
        B: AsRef<[u8]>,
        T: AsRef<[u8]>,
    {
        let form = Self::with_limits(limits.clone());
        let mut parser = MultipartParser::with_limits(boundary, form, limits)?;
        parser.write(body.as_ref())?;
        parser.end()?;
        Ok(parser.into_handler())
    }

    /// Gets the limits.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Gets the completed fields.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Consumes the collector, returning the completed fields.
    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    /// Gets the first field with the name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Counts the completed fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Checks if no field is completed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Handler for FormData {
    fn on_part_begin(&mut self) -> Result<()> {
        self.headers.clear();
        Ok(())
    }

    fn on_header_field(&mut self, field: &[u8]) -> Result<()> {
        self.header.push_name(field);
        Ok(())
    }

    fn on_header_value(&mut self, value: &[u8]) -> Result<()> {
        self.header.push_value(value);
        Ok(())
    }

    fn on_header_end(&mut self) -> Result<()> {
        let (name, value) = self.header.take()?;
        self.headers.append(name, value);
        Ok(())
    }

    fn on_headers_end(&mut self) -> Result<()> {
        let mut headers = std::mem::take(&mut self.headers);

        // invalid content disposition
        let Some((name, filename)) = headers
            .remove(CONTENT_DISPOSITION)
            .as_ref()
            .map(HeaderValue::as_bytes)
            .map(parse_content_disposition)
            .and_then(Result::ok)
        else {
            return Err(Error::InvalidContentDisposition);
        };

        // field name is too long
        if let Some(max) = self.limits.checked_field_name_size(name.len()) {
            return Err(Error::FieldNameTooLong(max));
        }

        if filename.is_some() {
            // files too many
            if let Some(max) = self.limits.checked_files(self.files + 1) {
                return Err(Error::FilesTooMany(max));
            }
            self.files += 1;
        } else {
            // fields too many
            if let Some(max) = self.limits.checked_fields(self.texts + 1) {
                return Err(Error::FieldsTooMany(max));
            }
            self.texts += 1;
        }

        let mut field = Field::empty();

        field.name = name;
        field.filename = filename;
        field.index = self.fields.len();
        field.content_type = parse_content_type(headers.remove(CONTENT_TYPE).as_ref());

        if !headers.is_empty() {
            field.headers.replace(headers);
        }

        trace!("field {:?}", field);

        self.current.replace((field, BytesMut::new()));
        Ok(())
    }

    fn on_part_data(&mut self, data: &[u8]) -> Result<()> {
        let Some((field, buffer)) = self.current.as_mut() else {
            return Ok(());
        };

        let l = field.length + data.len();

        if field.is_file() {
            if let Some(max) = self.limits.checked_file_size(l) {
                return Err(Error::FileTooLarge(max));
            }
        } else if let Some(max) = self.limits.checked_field_size(l) {
            return Err(Error::FieldTooLarge(max));
        }

        buffer.extend_from_slice(data);
        field.length = l;
        Ok(())
    }

    fn on_part_end(&mut self) -> Result<()> {
        if let Some((mut field, buffer)) = self.current.take() {
            field.data = buffer.freeze();
            trace!("collected {} {}", field.name, field.length);
            self.fields.push(field);
        }
        Ok(())
    }
}
