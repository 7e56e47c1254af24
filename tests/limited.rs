use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use anyhow::Result;

use multipart_parser::*;

mod lib;

use lib::{close, part, Counter, Limited};

fn body() -> Vec<u8> {
    let mut body = part(
        "AaB03x",
        &["Content-Disposition: form-data; name=\"submit-name\""],
        b"Larry",
    );
    body.extend(part(
        "AaB03x",
        &[
            "Content-Disposition: form-data; name=\"files\"; filename=\"file1.txt\"",
            "Content-Type: text/plain",
        ],
        &b"0123456789\r\n--AaB03".repeat(1024),
    ));
    body.extend(close("AaB03x"));
    body
}

struct Failing;

impl Read for Failing {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
    }
}

#[test]
fn read_from_cursor() -> Result<()> {
    let _ = lib::tracing_init();

    let body = body();

    for _ in 0..8 {
        let mut reader = Limited::random(Cursor::new(&body));
        let mut parser = MultipartParser::new("AaB03x", Counter::default())?;

        assert_eq!(parser.read_from(&mut reader)?, body.len() as u64);
        assert_eq!(reader.len(), body.len() as u64);

        let counter = parser.into_handler();
        assert_eq!(counter.sizes, [5, 20 * 1024]);
        assert_eq!(counter.end, 1);
    }

    Ok(())
}

#[test]
fn read_from_file() -> Result<()> {
    let body = body();

    let mut file = tempfile::tempfile()?;
    file.write_all(&body)?;
    file.seek(SeekFrom::Start(0))?;

    let mut reader = Limited::random_with(file, 512);
    let mut parser = MultipartParser::new("AaB03x", FormData::new())?;
    parser.read_from(&mut reader)?;

    let form = parser.into_handler();
    assert_eq!(form.len(), 2);
    assert_eq!(form.fields()[1].length, 20 * 1024);
    assert_eq!(
        form.get("submit-name").map(Field::as_bytes),
        Some(&b"Larry"[..])
    );

    Ok(())
}

#[test]
fn io_copy() -> Result<()> {
    let body = body();

    let mut reader = Limited::random(Cursor::new(&body));
    let mut parser = MultipartParser::new("AaB03x", Counter::default())?;

    let n = io::copy(&mut reader, &mut parser)?;
    parser.end()?;

    assert_eq!(n, body.len() as u64);
    assert_eq!(parser.handler().sizes, [5, 20 * 1024]);

    Ok(())
}

#[test]
fn io_copy_invalid() -> Result<()> {
    let mut parser = MultipartParser::new("AaB03x", ())?;
    let err = io::copy(&mut Cursor::new(b"--AaB03y\r\n"), &mut parser).unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert!(matches!(parser.end(), Err(Error::Poisoned)));

    Ok(())
}

#[test]
fn truncated_reader() -> Result<()> {
    let body = body();

    let mut reader = Limited::random(Cursor::new(&body[..body.len() / 2]));
    let mut parser = MultipartParser::new("AaB03x", ())?;

    assert!(matches!(
        parser.read_from(&mut reader),
        Err(Error::UnexpectedEndOfStream)
    ));

    Ok(())
}

#[test]
fn failing_reader() -> Result<()> {
    let mut parser = MultipartParser::new("AaB03x", ())?;

    match parser.read_from(&mut Failing) {
        Err(Error::Stream(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
        res => panic!("unexpected {:?}", res),
    }

    Ok(())
}

#[test]
fn buffer_size() -> Result<()> {
    let body = body();

    let limits = Limits::default().buffer_size(16 * 1024);
    let mut parser = MultipartParser::with_limits("AaB03x", Counter::default(), limits)?;
    parser.read_from(&mut Cursor::new(&body))?;

    assert_eq!(parser.limits().buffer_size, 16 * 1024);
    assert_eq!(parser.handler().part_end, 2);

    Ok(())
}
