//! Record sinks
//!
//! Persistence lives outside this crate; a sink receives accepted records in
//! batches and decides how to store them. `TsvSink` writes one row per
//! (record, sample) call, the same shape a relational `sample_info` table uses.

use crate::core::error::Result;
use crate::formats::record::VcfRecord;
use std::io::Write;

/// Receives batches of accepted records
pub trait VariantSink {
    /// Store a batch; every record handed in must be stored or an error returned
    fn write_batch(&mut self, records: &[VcfRecord]) -> Result<()>;

    /// Flush any buffered output
    fn finish(&mut self) -> Result<()>;
}

/// Tab-separated sample call writer
pub struct TsvSink<W: Write> {
    writer: W,
    header_written: bool,
    rows: usize,
}

impl<W: Write> TsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
            rows: 0,
        }
    }

    /// Number of sample rows written
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> VariantSink for TsvSink<W> {
    fn write_batch(&mut self, records: &[VcfRecord]) -> Result<()> {
        if !self.header_written {
            writeln!(self.writer, "chromosome\tposition\tsample\tallele_1\tallele_2\tdata")?;
            self.header_written = true;
        }

        for record in records {
            for call in record.sample_calls() {
                let data = record.sample(&call.sample_name).unwrap_or(".");
                writeln!(
                    self.writer,
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    record.chrom, record.pos, call.sample_name, call.allele1, call.allele2, data
                )?;
                self.rows += 1;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::reader::VcfReader;

    #[test]
    fn test_tsv_sink_rows() {
        let text = "##fileformat=VCFv4.1\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\tS2\n\
1\t100\t.\tA\tT\t.\tPASS\t.\tGT:DP\t0/1:4\t./.:0\n";
        let mut reader = VcfReader::from_stream(text.as_bytes()).unwrap();
        let batch = reader.read_batch(10).unwrap();

        let mut sink = TsvSink::new(Vec::new());
        sink.write_batch(&batch).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.rows(), 2);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "chromosome\tposition\tsample\tallele_1\tallele_2\tdata");
        assert_eq!(lines[1], "1\t100\tS1\t0\t1\t0/1:4");
        assert_eq!(lines[2], "1\t100\tS2\t-1\t-1\t./.:0");
    }

    #[test]
    fn test_site_only_records_write_no_rows() {
        let text = "##fileformat=VCFv4.1\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
1\t100\t.\tA\tT\t.\tPASS\t.\n";
        let mut reader = VcfReader::from_stream(text.as_bytes()).unwrap();
        let batch = reader.read_batch(10).unwrap();

        let mut sink = TsvSink::new(Vec::new());
        sink.write_batch(&batch).unwrap();
        assert_eq!(sink.rows(), 0);
    }
}
