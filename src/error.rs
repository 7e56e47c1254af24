use std::convert::Infallible;

use thiserror::Error;

/// Multipart parser Error
#[derive(Debug, Error)]
pub enum Error {
    /// IO Error
    #[error(transparent)]
    Stream(#[from] std::io::Error),

    /// Box Error
    #[error(transparent)]
    BoxError(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// Boundary is empty or too long
    #[error("invalid boundary")]
    InvalidBoundary,

    /// The body does not start with the expected boundary
    #[error("boundary mismatch at byte `{0}`")]
    BoundaryMismatch(u64),

    /// A part header line violates the header grammar
    #[error("malformed header syntax at byte `{offset}`, unexpected `{byte:#04x}`")]
    MalformedHeaderSyntax {
        /// Offset of the offending byte in the whole body
        offset: u64,
        /// The offending byte
        byte: u8,
    },

    /// The stream ended before the closing boundary
    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,

    /// Bytes received after the closing boundary
    #[error("unexpected data after the closing boundary at byte `{0}`")]
    TrailingData(u64),

    /// A previous call has already failed
    #[error("parser has already failed")]
    Poisoned,

    /// Invalid part header
    #[error("invalid part header")]
    InvalidHeader,

    /// Invalid content disposition
    #[error("invalid content disposition")]
    InvalidContentDisposition,

    /// Payload too large
    #[error("payload is too large, limit to `{0}`")]
    PayloadTooLarge(u64),

    /// Header line too large
    #[error("header is too large, limit to `{0}`")]
    HeaderTooLarge(usize),

    /// Headers too many
    #[error("headers is too many, limit to `{0}`")]
    HeadersTooMany(usize),

    /// File too large
    #[error("file is too large, limit to `{0}`")]
    FileTooLarge(usize),

    /// Field too large
    #[error("field is too large, limit to `{0}`")]
    FieldTooLarge(usize),

    /// Parts too many
    #[error("parts is too many, limit to `{0}`")]
    PartsTooMany(usize),

    /// Fields too many
    #[error("fields is too many, limit to `{0}`")]
    FieldsTooMany(usize),

    /// Files too many
    #[error("files is too many, limit to `{0}`")]
    FilesTooMany(usize),

    /// Field name is too long
    #[error("field name is too long, limit to `{0}`")]
    FieldNameTooLong(usize),
}

impl From<Infallible> for Error {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}
