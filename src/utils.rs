use http::header::HeaderValue;

use crate::{Error, Result};

pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';
pub(crate) const HYPHEN: u8 = b'-';
pub(crate) const COLON: u8 = b':';
pub(crate) const SPACE: u8 = b' ';
pub(crate) const TAB: u8 = b'\t';
pub(crate) const DASHES: [u8; 2] = [HYPHEN, HYPHEN]; // `--`
pub(crate) const CRLF: [u8; 2] = [CR, LF]; // `\r\n`

const NAME: &[u8; 4] = b"name";
const FILE_NAME: &[u8; 8] = b"filename";
const FORM_DATA: &[u8; 9] = b"form-data";

/// `tchar` of RFC 7230, the bytes allowed in a header field name.
pub(crate) fn is_token(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'\''
            | b'*'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~'
    ) || b.is_ascii_alphanumeric()
}

pub(crate) fn parse_content_type(header: Option<&HeaderValue>) -> Option<mime::Mime> {
    header
        .map(HeaderValue::to_str)
        .and_then(Result::ok)
        .map(str::parse)
        .and_then(Result::ok)
}

/// Parses `form-data; name="field"; filename="file.txt"` into the name and the optional filename.
pub(crate) fn parse_content_disposition(hv: &[u8]) -> Result<(String, Option<String>)> {
    let mut params = Params { hv, pos: 0 };

    let kind = params.next().ok_or(Error::InvalidContentDisposition)?;
    if !kind.eq_ignore_ascii_case(FORM_DATA) {
        return Err(Error::InvalidContentDisposition);
    }

    let mut name = None;
    let mut filename = None;

    for param in params {
        let Some(eq) = memchr::memchr(b'=', param) else {
            continue;
        };
        let key = trim(&param[..eq]);
        let value = trim(&param[eq + 1..]);

        if key.eq_ignore_ascii_case(NAME) {
            name.get_or_insert_with(|| unquote(value));
        } else if key.eq_ignore_ascii_case(FILE_NAME) {
            filename.get_or_insert_with(|| unquote(value));
        }
    }

    match name {
        Some(name) if !name.is_empty() => Ok((name, filename)),
        _ => Err(Error::InvalidContentDisposition),
    }
}

/// Splits a header value on `;`, ignoring separators inside quoted strings.
struct Params<'a> {
    hv: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Params<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.hv.len() {
            return None;
        }

        let start = self.pos;
        let mut quoted = false;
        let mut escaped = false;
        let mut i = start;

        while i < self.hv.len() {
            match self.hv[i] {
                _ if escaped => escaped = false,
                b'\\' if quoted => escaped = true,
                b'"' => quoted = !quoted,
                b';' if !quoted => break,
                _ => {}
            }
            i += 1;
        }

        self.pos = i + 1;
        Some(trim(&self.hv[start..i]))
    }
}

fn trim(mut s: &[u8]) -> &[u8] {
    while let [SPACE | TAB, rest @ ..] = s {
        s = rest;
    }
    while let [rest @ .., SPACE | TAB] = s {
        s = rest;
    }
    s
}

fn unquote(value: &[u8]) -> String {
    match value {
        [b'"', inner @ .., b'"'] => {
            let mut out = Vec::with_capacity(inner.len());
            let mut escaped = false;
            for &b in inner {
                if !escaped && b == b'\\' {
                    escaped = true;
                    continue;
                }
                escaped = false;
                out.push(b);
            }
            String::from_utf8_lossy(&out).into_owned()
        }
        _ => String::from_utf8_lossy(value).into_owned(),
    }
}
