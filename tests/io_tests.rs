use detailer::{ByteSource, Error, Format};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use tempfile::NamedTempFile;

/// Reads fail after the first `budget` bytes.
struct FailingSource {
    data: io::Cursor<Vec<u8>>,
    budget: usize,
}

impl Read for FailingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::other("device went away"));
        }
        let n = buf.len().min(self.budget);
        let n = self.data.read(&mut buf[..n])?;
        self.budget -= n;
        Ok(n)
    }
}

impl Seek for FailingSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.data.seek(pos)
    }
}

#[test]
fn test_file_as_byte_source() {
    let mut temp = NamedTempFile::new().unwrap();
    let test_data = vec![0xAA; 4096];
    temp.write_all(&test_data).unwrap();
    temp.flush().unwrap();

    let mut file = File::open(temp.path()).unwrap();
    assert_eq!(file.size().unwrap(), 4096);

    file.seek_to(SeekFrom::Start(4000)).unwrap();
    let mut buf = vec![0u8; 200];
    assert_eq!(file.fill(&mut buf).unwrap(), 96);
}

#[test]
fn test_buffered_file_as_byte_source() {
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(&[0xFF, 0xD8, 0xFF, 0xDA, 0x01, 0xFF, 0xD9, 0x00])
        .unwrap();
    temp.flush().unwrap();

    let mut reader = BufReader::new(File::open(temp.path()).unwrap());
    let result = Format::Jpeg.parse(&mut reader).unwrap();
    assert_eq!(result.data_end, 7);
}

#[test]
fn test_read_failure_is_io_error() {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xDA];
    data.extend_from_slice(&[0x00; 1024]);
    let mut source = FailingSource {
        data: io::Cursor::new(data),
        budget: 100,
    };

    let err = Format::Jpeg.parse(&mut source).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{err}");
}

#[test]
fn test_validate_read_failure_is_io_error() {
    let mut source = FailingSource {
        data: io::Cursor::new(vec![0x89; 16]),
        budget: 0,
    };

    assert!(matches!(
        Format::Png.validate(&mut source),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_dyn_byte_source() {
    let mut cursor = io::Cursor::new(vec![0xFFu8, 0xD8, 0xFF, 0xD9]);
    let source: &mut dyn ByteSource = &mut cursor;

    assert!(Format::Jpeg.validate(&mut *source).unwrap());
    assert_eq!(Format::Jpeg.parse(&mut *source).unwrap().data_end, 4);
}
