#![no_main]
use libfuzzer_sys::fuzz_target;

use multipart_parser::{FormData, Limits, MultipartParser};

fuzz_target!(|data: &[u8]| {
    // first byte picks the chunk size
    let Some((&size, body)) = data.split_first() else {
        return;
    };
    let size = usize::from(size).max(1);

    let Ok(mut parser) = MultipartParser::new("BOUNDARY", FormData::with_limits(Limits::default()))
    else {
        return;
    };

    for chunk in body.chunks(size) {
        if parser.write(chunk).is_err() {
            return;
        }
        assert!(parser.lookbehind() < "\r\n--BOUNDARY".len());
    }

    let _ = parser.end();
});
