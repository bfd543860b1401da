//! Input stream handling
//!
//! Opens plain or gzip-compressed VCF files behind a single `BufRead` and
//! provides a line reader that tracks line numbers and supports a one-line
//! pushback, so header parsing can stop exactly at the first data line.

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Default buffer size for BufReader (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Gzip magic bytes
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compression format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Plain text (uncompressed)
    Plain,
    /// Gzip or BGZF compressed (.gz)
    Gzip,
}

/// Detect compression format from file path and/or content
pub fn detect_compression(path: &Path) -> io::Result<CompressionFormat> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    // First check by extension
    if extension == "gz" || extension == "bgz" {
        return Ok(CompressionFormat::Gzip);
    }

    // Then check by magic bytes
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let bytes_read = file.read(&mut magic)?;

    if bytes_read == 2 && magic == GZIP_MAGIC {
        return Ok(CompressionFormat::Gzip);
    }

    Ok(CompressionFormat::Plain)
}

/// Open a VCF source, transparently decompressing gzip input
///
/// The returned reader owns the file handle; dropping it closes the file.
pub fn open_source(path: &Path, buffer_size: usize) -> io::Result<Box<dyn BufRead>> {
    let format = detect_compression(path)?;
    let file = File::open(path)?;

    match format {
        CompressionFormat::Gzip => {
            let decoder = MultiGzDecoder::new(file);
            Ok(Box::new(BufReader::with_capacity(buffer_size, decoder)))
        }
        CompressionFormat::Plain => Ok(Box::new(BufReader::with_capacity(buffer_size, file))),
    }
}

/// Line reader that reuses a buffer, counts lines and can push one line back
pub struct LineReader<R: BufRead> {
    reader: R,
    buffer: String,
    pushed_back: Option<String>,
    line_number: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::with_capacity(1024),
            pushed_back: None,
            line_number: 0,
        }
    }

    /// Read the next line, without its trailing newline
    /// Returns Ok(None) at EOF
    pub fn next_line(&mut self) -> io::Result<Option<&str>> {
        if let Some(line) = self.pushed_back.take() {
            self.line_number += 1;
            self.buffer = line;
            return Ok(Some(&self.buffer));
        }

        self.buffer.clear();
        if self.reader.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        // Remove trailing newline
        if self.buffer.ends_with('\n') {
            self.buffer.pop();
            if self.buffer.ends_with('\r') {
                self.buffer.pop();
            }
        }
        Ok(Some(&self.buffer))
    }

    /// Return a line to the reader; the next call to `next_line` yields it again
    pub fn push_back(&mut self, line: String) {
        debug_assert!(self.pushed_back.is_none(), "only one line of pushback");
        self.line_number = self.line_number.saturating_sub(1);
        self.pushed_back = Some(line);
    }

    /// 1-based number of the line most recently returned (0 before any read)
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Release the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}
