use std::fmt;

use bytes::{Bytes, BytesMut};
use memchr::memmem::Finder;

use crate::utils::{CR, CRLF, DASHES};

/// The in-body form of a boundary, `\r\n--boundary`.
///
/// Besides the bytes it keeps a `memmem` finder for the fast path and the
/// partial-match table used to resume a match that straddles two chunks.
pub(crate) struct Delimiter {
    bytes: Bytes,
    finder: Finder<'static>,
    fallback: Box<[usize]>,
}

impl Delimiter {
    pub(crate) fn new(boundary: &[u8]) -> Self {
        let mut bytes = BytesMut::with_capacity(4 + boundary.len());
        bytes.extend_from_slice(&CRLF);
        bytes.extend_from_slice(&DASHES);
        bytes.extend_from_slice(boundary);
        let bytes = bytes.freeze();

        Self {
            finder: Finder::new(&bytes).into_owned(),
            fallback: fallback_table(&bytes),
            bytes,
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `boundary`
    pub(crate) fn boundary(&self) -> &[u8] {
        &self.bytes[4..]
    }

    /// `--boundary`, the form opening the body.
    pub(crate) fn dashed(&self) -> &[u8] {
        &self.bytes[2..]
    }

    pub(crate) fn find(&self, haystack: &[u8]) -> Option<usize> {
        self.finder.find(haystack)
    }

    /// Finds where the longest suffix of `haystack` that is a proper prefix of
    /// the delimiter starts.
    pub(crate) fn partial_suffix(&self, haystack: &[u8]) -> Option<usize> {
        let mut pos = haystack.len().saturating_sub(self.len() - 1);

        while let Some(n) = memchr::memchr(CR, &haystack[pos..]) {
            let start = pos + n;
            if self.bytes.starts_with(&haystack[start..]) {
                return Some(start);
            }
            pos = start + 1;
        }

        None
    }

    /// Length of the longest proper prefix of `delimiter[..matched]` that is also its suffix.
    pub(crate) fn fallback(&self, matched: usize) -> usize {
        self.fallback[matched - 1]
    }
}

impl fmt::Debug for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Delimiter")
            .field(&String::from_utf8_lossy(&self.bytes))
            .finish()
    }
}

fn fallback_table(pattern: &[u8]) -> Box<[usize]> {
    let mut table = vec![0; pattern.len()];
    let mut k = 0;

    for i in 1..pattern.len() {
        while k > 0 && pattern[i] != pattern[k] {
            k = table[k - 1];
        }
        if pattern[i] == pattern[k] {
            k += 1;
        }
        table[i] = k;
    }

    table.into_boxed_slice()
}
