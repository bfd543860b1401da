//! Streaming VCF reader
//!
//! Opens a plain or gzip source, parses the header up front and then hands
//! out records one at a time or in filtered batches. The stream is
//! forward-only; build a new reader to read a source again.

use crate::core::error::{Result, VcfError, STREAM_ORIGIN};
use crate::core::filter::{FilterChain, RecordPredicate};
use crate::core::io::{open_source, LineReader, DEFAULT_BUFFER_SIZE};
use crate::formats::header::{SampleIndex, VcfHeader};
use crate::formats::record::{ReadOutcome, VcfRecord};
use crate::formats::stats::VariantStats;
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

/// Default number of records per batch
pub const DEFAULT_BATCH_SIZE: usize = 40_000;

/// Input dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Plain VCF records
    #[default]
    Standard,
    /// Exome Variant Server annotations: attach `VariantStats` from MAF/GTS/GTC
    Evs,
}

/// Reader settings
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub buffer_size: usize,
    pub dialect: Dialect,
    pub batch_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            dialect: Dialect::Standard,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Counters kept while reading
#[derive(Debug, Default, Clone)]
pub struct ReadStats {
    /// Records parsed successfully
    pub records: usize,
    /// Lines dropped for having fewer than 8 columns
    pub skipped: usize,
    /// Lines rejected with a record error
    pub malformed: usize,
    /// Records rejected by the filter chain in batch reads
    pub filtered: usize,
}

/// Pull-based VCF reader
pub struct VcfReader<R: BufRead> {
    lines: LineReader<R>,
    origin: String,
    header: VcfHeader,
    sample_index: Arc<SampleIndex>,
    config: ReaderConfig,
    filters: FilterChain,
    /// Records accepted by an interrupted batch, delivered before any new line is read
    pending: VecDeque<VcfRecord>,
    stats: ReadStats,
}

impl VcfReader<Box<dyn BufRead>> {
    /// Open a file (gzip detected automatically) and parse its header
    ///
    /// If the header is unusable the file is closed before the error is returned.
    pub fn open<P: AsRef<Path>>(path: P, config: ReaderConfig) -> Result<Self> {
        let path = path.as_ref();
        let source = open_source(path, config.buffer_size)?;
        let reader = Self::from_reader(source, path.display().to_string(), config)?;
        info!(
            "Opened {} ({} samples)",
            reader.origin,
            reader.header.sample_names().len()
        );
        Ok(reader)
    }
}

impl<R: BufRead> VcfReader<R> {
    /// Wrap any buffered source and parse its header
    pub fn from_reader(reader: R, origin: impl Into<String>, config: ReaderConfig) -> Result<Self> {
        let origin = origin.into();
        let mut lines = LineReader::new(reader);
        let header = VcfHeader::read_from(&mut lines, &origin)?;
        let sample_index = header.sample_index();

        Ok(Self {
            lines,
            origin,
            header,
            sample_index,
            config,
            filters: FilterChain::new(),
            pending: VecDeque::new(),
            stats: ReadStats::default(),
        })
    }

    /// Reader over an in-memory or unnamed stream
    pub fn from_stream(reader: R) -> Result<Self> {
        Self::from_reader(reader, STREAM_ORIGIN, ReaderConfig::default())
    }

    /// Builder-style filter registration
    pub fn with_filter<P: RecordPredicate + 'static>(mut self, predicate: P) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn add_filter<P: RecordPredicate + 'static>(&mut self, predicate: P) {
        self.filters.push(predicate);
    }

    /// Replace the whole filter chain
    pub fn set_filters(&mut self, filters: FilterChain) {
        self.filters = filters;
    }

    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    pub fn sample_names(&self) -> &[String] {
        self.header.sample_names()
    }

    /// Header rendered back to text
    pub fn render_header(&self) -> String {
        self.header.render()
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    /// Read the next line as a record
    ///
    /// Records held back by an interrupted batch come first. Blank lines and
    /// stray `#` lines are passed over. Lines with fewer than 8 columns yield
    /// `Skipped`; a bad POS yields a `MalformedRecord` error and the reader
    /// stays usable.
    pub fn read(&mut self) -> Result<ReadOutcome> {
        if let Some(record) = self.pending.pop_front() {
            return Ok(ReadOutcome::Record(record));
        }

        loop {
            let line = match self.lines.next_line()? {
                Some(line) => line,
                None => return Ok(ReadOutcome::EndOfStream),
            };
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            return match VcfRecord::parse(line, &self.sample_index) {
                Ok(Some(mut record)) => {
                    if self.config.dialect == Dialect::Evs {
                        record.stats = Some(VariantStats::from_record(&record));
                    }
                    self.stats.records += 1;
                    Ok(ReadOutcome::Record(record))
                }
                Ok(None) => {
                    debug!(
                        "{}:{}: dropping line with fewer than 8 columns",
                        self.origin,
                        self.lines.line_number()
                    );
                    self.stats.skipped += 1;
                    Ok(ReadOutcome::Skipped)
                }
                Err(e) => {
                    self.stats.malformed += 1;
                    Err(VcfError::malformed_record(
                        &self.origin,
                        self.lines.line_number(),
                        e.to_string(),
                    ))
                }
            };
        }
    }

    /// Read up to `n` records accepted by the filter chain
    ///
    /// Returns fewer than `n` records only when the stream is exhausted. If a
    /// record error interrupts the batch, the records already accepted are kept
    /// and returned before anything else by the next read or batch.
    pub fn read_batch(&mut self, n: usize) -> Result<Vec<VcfRecord>> {
        let held = n.min(self.pending.len());
        let mut batch: Vec<VcfRecord> = self.pending.drain(..held).collect();
        if batch.len() == n {
            return Ok(batch);
        }
        batch.reserve(n - batch.len());

        while batch.len() < n {
            match self.read() {
                Ok(ReadOutcome::Record(record)) => {
                    if self.filters.combined_accepts(&record) {
                        batch.push(record);
                    } else {
                        self.stats.filtered += 1;
                    }
                }
                Ok(ReadOutcome::Skipped) => continue,
                Ok(ReadOutcome::EndOfStream) => break,
                Err(e) => {
                    // pending is empty here
                    self.pending.extend(batch);
                    return Err(e);
                }
            }
        }

        Ok(batch)
    }

    /// Read a batch of the configured size
    pub fn next_batch(&mut self) -> Result<Vec<VcfRecord>> {
        self.read_batch(self.config.batch_size)
    }

    /// Close the source, returning the counters gathered so far
    pub fn close(self) -> ReadStats {
        info!(
            "Closed {}: {} records, {} skipped, {} malformed, {} filtered",
            self.origin,
            self.stats.records,
            self.stats.skipped,
            self.stats.malformed,
            self.stats.filtered
        );
        if !self.pending.is_empty() {
            warn!(
                "{}: closing with {} accepted records never read",
                self.origin,
                self.pending.len()
            );
        }
        drop(self.lines.into_inner());
        self.stats
    }
}

/// Iterates records, passing over skipped lines
impl<R: BufRead> Iterator for VcfReader<R> {
    type Item = Result<VcfRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.read() {
                Ok(ReadOutcome::Record(record)) => return Some(Ok(record)),
                Ok(ReadOutcome::Skipped) => continue,
                Ok(ReadOutcome::EndOfStream) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
