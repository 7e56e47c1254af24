#![allow(dead_code)]

mod limited;
pub use limited::Limited;

use multipart_parser::{Handler, Limits, MultipartParser, Result};
use rand::Rng;

pub fn tracing_init() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // From env var: `RUST_LOG`
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

#[derive(Clone, PartialEq, Eq)]
pub enum Event {
    PartBegin,
    HeaderField(Vec<u8>),
    HeaderValue(Vec<u8>),
    HeaderEnd,
    HeadersEnd,
    PartData(Vec<u8>),
    PartEnd,
    End,
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::PartBegin => f.write_str("PartBegin"),
            Event::HeaderField(b) => write!(f, "HeaderField({:?})", String::from_utf8_lossy(b)),
            Event::HeaderValue(b) => write!(f, "HeaderValue({:?})", String::from_utf8_lossy(b)),
            Event::HeaderEnd => f.write_str("HeaderEnd"),
            Event::HeadersEnd => f.write_str("HeadersEnd"),
            Event::PartData(b) => write!(f, "PartData({:?})", String::from_utf8_lossy(b)),
            Event::PartEnd => f.write_str("PartEnd"),
            Event::End => f.write_str("End"),
        }
    }
}

/// Records every event as delivered.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl Recorder {
    /// Events with adjacent fragments joined, comparable whatever the chunking.
    pub fn merged(&self) -> Vec<Event> {
        let mut out: Vec<Event> = Vec::with_capacity(self.events.len());
        for e in &self.events {
            match (out.last_mut(), e) {
                (Some(Event::HeaderField(a)), Event::HeaderField(b))
                | (Some(Event::HeaderValue(a)), Event::HeaderValue(b))
                | (Some(Event::PartData(a)), Event::PartData(b)) => a.extend_from_slice(b),
                _ => out.push(e.clone()),
            }
        }
        out
    }
}

impl Handler for Recorder {
    fn on_part_begin(&mut self) -> Result<()> {
        self.events.push(Event::PartBegin);
        Ok(())
    }

    fn on_header_field(&mut self, field: &[u8]) -> Result<()> {
        self.events.push(Event::HeaderField(field.to_vec()));
        Ok(())
    }

    fn on_header_value(&mut self, value: &[u8]) -> Result<()> {
        self.events.push(Event::HeaderValue(value.to_vec()));
        Ok(())
    }

    fn on_header_end(&mut self) -> Result<()> {
        self.events.push(Event::HeaderEnd);
        Ok(())
    }

    fn on_headers_end(&mut self) -> Result<()> {
        self.events.push(Event::HeadersEnd);
        Ok(())
    }

    fn on_part_data(&mut self, data: &[u8]) -> Result<()> {
        self.events.push(Event::PartData(data.to_vec()));
        Ok(())
    }

    fn on_part_end(&mut self) -> Result<()> {
        self.events.push(Event::PartEnd);
        Ok(())
    }

    fn on_end(&mut self) -> Result<()> {
        self.events.push(Event::End);
        Ok(())
    }
}

/// Counts events and part sizes without keeping any payload.
#[derive(Debug, Default)]
pub struct Counter {
    pub part_begin: usize,
    pub header_field: usize,
    pub header_value: usize,
    pub header_end: usize,
    pub headers_end: usize,
    pub part_data: usize,
    pub part_end: usize,
    pub end: usize,
    pub sizes: Vec<u64>,
}

impl Handler for Counter {
    fn on_part_begin(&mut self) -> Result<()> {
        self.part_begin += 1;
        self.sizes.push(0);
        Ok(())
    }

    fn on_header_field(&mut self, _: &[u8]) -> Result<()> {
        self.header_field += 1;
        Ok(())
    }

    fn on_header_value(&mut self, _: &[u8]) -> Result<()> {
        self.header_value += 1;
        Ok(())
    }

    fn on_header_end(&mut self) -> Result<()> {
        self.header_end += 1;
        Ok(())
    }

    fn on_headers_end(&mut self) -> Result<()> {
        self.headers_end += 1;
        Ok(())
    }

    fn on_part_data(&mut self, data: &[u8]) -> Result<()> {
        self.part_data += 1;
        if let Some(size) = self.sizes.last_mut() {
            *size += data.len() as u64;
        }
        Ok(())
    }

    fn on_part_end(&mut self) -> Result<()> {
        self.part_end += 1;
        Ok(())
    }

    fn on_end(&mut self) -> Result<()> {
        self.end += 1;
        Ok(())
    }
}

/// `--boundary\r\n{headers}\r\n\r\n{data}\r\n`, headers joined by `\r\n`.
pub fn part(boundary: &str, headers: &[&str], data: &[u8]) -> Vec<u8> {
    let mut buf = format!("--{}\r\n", boundary).into_bytes();
    for header in headers {
        buf.extend_from_slice(header.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(data);
    buf.extend_from_slice(b"\r\n");
    buf
}

/// `--boundary--\r\n`
pub fn close(boundary: &str) -> Vec<u8> {
    format!("--{}--\r\n", boundary).into_bytes()
}

/// Parses `body` split in chunks of `size` bytes.
pub fn parse_chunked(boundary: &str, body: &[u8], size: usize) -> Result<Recorder> {
    let mut parser = MultipartParser::with_limits(boundary, Recorder::default(), Limits::unlimited())?;
    for chunk in body.chunks(size) {
        assert_eq!(parser.write(chunk)?, chunk.len());
    }
    parser.end()?;
    Ok(parser.into_handler())
}

/// Parses `body` split at random positions.
pub fn parse_random(boundary: &str, body: &[u8], max: usize) -> Result<Recorder> {
    let mut rng = rand::thread_rng();
    let mut parser = MultipartParser::with_limits(boundary, Recorder::default(), Limits::unlimited())?;
    let mut rest = body;
    while !rest.is_empty() {
        let n = rng.gen_range(1..=max.min(rest.len()));
        let (chunk, tail) = rest.split_at(n);
        parser.write(chunk)?;
        rest = tail;
    }
    parser.end()?;
    Ok(parser.into_handler())
}
