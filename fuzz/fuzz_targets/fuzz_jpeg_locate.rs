#![no_main]

use detailer::formats::jpeg;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Small windows push the refill path through every split.
    for window in [16, 257, jpeg::JPEG_WINDOW_SIZE] {
        if let Ok(result) = jpeg::locate_end_with_window(&mut Cursor::new(data), window) {
            assert!(result.data_end <= data.len() as u64);
            assert!(result.data_end >= 4);
            let end = result.data_end as usize;
            assert_eq!(&data[end - 2..end], &jpeg::JPEG_EOI);
        }
    }
});
