use std::convert::Infallible;
use std::io;

use anyhow::Result;
use bytes::Bytes;
use futures_util::stream;

use multipart_parser::*;

mod lib;

use lib::{close, part, Counter};

fn chunks(body: &[u8], size: usize) -> Vec<io::Result<Bytes>> {
    body.chunks(size)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect()
}

#[tokio::test]
async fn from_stream() -> Result<()> {
    let _ = lib::tracing_init();

    let mut body = part(
        "XYZ",
        &["Content-Disposition: form-data; name=\"a\""],
        b"hello\r\n--XY",
    );
    body.extend(part(
        "XYZ",
        &["Content-Disposition: form-data; name=\"b\"; filename=\"b.txt\""],
        &[b'b'; 4096],
    ));
    body.extend(close("XYZ"));

    for size in [1, 3, 64, 1024, body.len()] {
        let mut parser = MultipartParser::new("XYZ", FormData::new())?;
        let n = parser.read_stream(stream::iter(chunks(&body, size))).await?;

        assert_eq!(n, body.len() as u64);

        let form = parser.into_handler();
        assert_eq!(form.get("a").map(Field::as_bytes), Some(&b"hello\r\n--XY"[..]));
        assert_eq!(form.get("b").map(|f| f.length), Some(4096));
    }

    Ok(())
}

#[tokio::test]
async fn infallible_stream() -> Result<()> {
    let body = [part("XYZ", &[], b"data"), close("XYZ")].concat();
    let items = body
        .chunks(5)
        .map(|c| Ok::<_, Infallible>(c.to_vec()))
        .collect::<Vec<_>>();

    let mut parser = MultipartParser::new("XYZ", Counter::default())?;
    parser.read_stream(stream::iter(items)).await?;

    assert_eq!(parser.handler().sizes, [4]);

    Ok(())
}

#[tokio::test]
async fn failing_stream() -> Result<()> {
    let items = vec![
        Ok(Bytes::from_static(b"--XYZ\r\n")),
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "closed")),
    ];

    let mut parser = MultipartParser::new("XYZ", ())?;

    match parser.read_stream(stream::iter(items)).await {
        Err(Error::Stream(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        res => panic!("unexpected {:?}", res),
    }

    Ok(())
}

#[tokio::test]
async fn truncated_stream() -> Result<()> {
    let body = part("XYZ", &[], b"data");

    let mut parser = MultipartParser::new("XYZ", ())?;

    assert!(matches!(
        parser.read_stream(stream::iter(chunks(&body, 2))).await,
        Err(Error::UnexpectedEndOfStream)
    ));

    Ok(())
}
