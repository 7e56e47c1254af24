//! Incremental `multipart/form-data` parser, [rfc7578]
//!
//! The [`MultipartParser`] is a push parser: feed it chunks of the request
//! body as they arrive, in any size, and it calls back a [`Handler`] with the
//! events of the body, part boundaries, header fragments and slices of part
//! data. It never buffers a part, so memory stays bounded by the boundary
//! length whatever the upload size.
//!
//! [`FormData`] is a ready-made handler collecting the parts into in-memory
//! [`Field`]s, and [`Callbacks`] registers closures per event.
//!
//! # Example
//!
//! ```rust
//! use multipart_parser::{Handler, MultipartParser, PendingHeader, Result};
//!
//! #[derive(Default)]
//! struct Printer {
//!     header: PendingHeader,
//!     size: usize,
//! }
//!
//! impl Handler for Printer {
//!     fn on_header_field(&mut self, field: &[u8]) -> Result<()> {
//!         self.header.push_name(field);
//!         Ok(())
//!     }
//!
//!     fn on_header_value(&mut self, value: &[u8]) -> Result<()> {
//!         self.header.push_value(value);
//!         Ok(())
//!     }
//!
//!     fn on_header_end(&mut self) -> Result<()> {
//!         let (name, value) = self.header.take()?;
//!         tracing::info!("{}: {:?}", name, value);
//!         Ok(())
//!     }
//!
//!     fn on_part_data(&mut self, data: &[u8]) -> Result<()> {
//!         self.size += data.len();
//!         Ok(())
//!     }
//!
//!     fn on_part_end(&mut self) -> Result<()> {
//!         tracing::info!("part {} bytes", self.size);
//!         self.size = 0;
//!         Ok(())
//!     }
//! }
//!
//! let body = "--AaB03x\r\n\
//!     Content-Disposition: form-data; name=\"field1\"\r\n\
//!     Content-Type: text/plain;charset=UTF-8\r\n\
//!     Content-Transfer-Encoding: quoted-printable\r\n\r\n\
//!     Joe owes =E2=82=AC100.\r\n\
//!     --AaB03x--\r\n";
//!
//! let mut parser = MultipartParser::new("AaB03x", Printer::default())?;
//!
//! // chunks as small as a single byte are fine
//! for chunk in body.as_bytes().chunks(7) {
//!     parser.write(chunk)?;
//! }
//! parser.end()?;
//!
//! assert_eq!(parser.total(), 1);
//! # Ok::<(), multipart_parser::Error>(())
//! ```
//!
//! [rfc7578]: <https://tools.ietf.org/html/rfc7578>

#![forbid(unsafe_code)]
#![deny(nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod boundary;
mod error;
mod field;
mod form;
mod handler;
mod header;
mod limits;
mod state;
mod sync;
mod utils;

pub use form::FormData;

pub use field::Field;

pub use handler::{Callbacks, Handler};

pub use header::PendingHeader;

pub use state::*;

pub use limits::Limits;

pub use error::Error;

/// A Result type often returned from methods that can have multipart errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(feature = "async")]
mod r#async;
