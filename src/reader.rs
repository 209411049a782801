use anyhow::{Context, Result};
use bzip2::read::MultiBzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

const READ_BUFFER: usize = 128 * 1024;

/// Line iterator over an input file, decompressing `.bz2` files on the fly.
///
/// Lines are yielded without their terminator. Invalid UTF-8 is replaced with U+FFFD.
pub struct LineReader {
    reader: Box<dyn BufRead + Send>,
    buf: Vec<u8>,
}

impl LineReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let inner: Box<dyn Read + Send> = if is_bz2(path) {
            Box::new(MultiBzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::from_reader(inner))
    }

    pub fn from_reader(inner: Box<dyn Read + Send>) -> Self {
        Self {
            reader: Box::new(BufReader::with_capacity(READ_BUFFER, inner)),
            buf: Vec::new(),
        }
    }
}

impl Iterator for LineReader {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

fn is_bz2(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bz2"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::write::BzEncoder;
    use bzip2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn collect(reader: LineReader) -> Vec<String> {
        reader.map(|l| l.unwrap()).collect()
    }

    #[test]
    fn reads_plain_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.txt");
        std::fs::write(&path, "one\ntwo\r\n\nthree").unwrap();

        let lines = collect(LineReader::open(&path).unwrap());
        assert_eq!(lines, vec!["one", "two", "", "three"]);
    }

    #[test]
    fn reads_bz2_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("packed.txt.bz2");
        let mut encoder = BzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(b"alpha\nbeta\n").unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let lines = collect(LineReader::open(&path).unwrap());
        assert_eq!(lines, vec!["alpha", "beta"]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let reader = LineReader::from_reader(Box::new(&b"ok\n\xff\xfe bad\n"[..]));
        let lines = collect(reader);
        assert_eq!(lines[0], "ok");
        assert!(lines[1].ends_with(" bad"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(LineReader::open(&dir.path().join("missing.txt")).is_err());
    }
}
