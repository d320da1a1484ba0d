#![no_main]

use detailer::Format;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    if let Ok(result) = Format::Png.parse(&mut Cursor::new(data)) {
        assert!(result.data_end <= data.len() as u64);
        assert!(result.data_end >= 20);
    }
});
