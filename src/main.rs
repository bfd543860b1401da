//! vcf4-reader CLI entry point
//!
//! Streams VCF files: header rendering, filtered record views, EVS genotype
//! statistics and sample call export.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use vcf4_reader::formats::DEFAULT_BATCH_SIZE;
use vcf4_reader::{filters, Dialect, ReaderConfig, TsvSink, VariantSink, VcfReader};

#[derive(Parser)]
#[command(name = "vcf4-reader")]
#[command(about = "Streaming VCF v4 reader and EVS genotype statistics")]
#[command(version)]
#[command(author = "vcf4-reader Contributors")]
struct Cli {
    /// Records per batch
    #[arg(long = "batch-size", global = true, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the parsed header, rendered back to VCF text
    Header {
        /// Input VCF file (plain or gzip)
        input: PathBuf,
    },
    /// Print records that pass all filters
    View {
        /// Input VCF file (plain or gzip)
        input: PathBuf,
        /// Output file (optional, stdout if not specified)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        /// Keep only FILTER=PASS records
        #[arg(long = "pass-only")]
        pass_only: bool,
        /// Keep only records on this chromosome
        #[arg(long)]
        chrom: Option<String>,
        /// Minimum QUAL (records with QUAL "." are dropped)
        #[arg(long = "min-qual")]
        min_qual: Option<f64>,
        /// Keep only single-nucleotide variants
        #[arg(long = "snv-only")]
        snv_only: bool,
        /// Omit the header from the output
        #[arg(long = "no-header")]
        no_header: bool,
    },
    /// Decode EVS MAF/GTS/GTC annotations into per-variant statistics
    Evs {
        /// Input EVS VCF file (plain or gzip)
        input: PathBuf,
        /// Output file (optional, stdout if not specified)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Write one row per sample call (chromosome, position, sample, alleles, data)
    Export {
        /// Input VCF file (plain or gzip)
        input: PathBuf,
        /// Output TSV file
        output: PathBuf,
    },
}

fn create_output(output: Option<&Path>) -> anyhow::Result<BufWriter<Box<dyn Write>>> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    Ok(BufWriter::with_capacity(128 * 1024, writer))
}

fn open_reader(input: &Path, config: ReaderConfig) -> anyhow::Result<VcfReader<Box<dyn io::BufRead>>> {
    VcfReader::open(input, config).with_context(|| format!("Failed to open {}", input.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();
    let batch_size = cli.batch_size.max(1);

    match cli.command {
        Commands::Header { input } => {
            let reader = open_reader(&input, ReaderConfig::default())?;
            let mut out = create_output(None)?;
            out.write_all(reader.render_header().as_bytes())?;
            out.flush()?;
            reader.close();
        }

        Commands::View { input, output, pass_only, chrom, min_qual, snv_only, no_header } => {
            let config = ReaderConfig { batch_size, ..Default::default() };
            let mut reader = open_reader(&input, config)?;
            if pass_only {
                reader.add_filter(filters::pass_only());
            }
            if let Some(chrom) = chrom {
                reader.add_filter(filters::chromosome(chrom));
            }
            if let Some(min_qual) = min_qual {
                reader.add_filter(filters::min_quality(min_qual));
            }
            if snv_only {
                reader.add_filter(filters::snv_only());
            }

            let mut out = create_output(output.as_deref())?;
            if !no_header {
                out.write_all(reader.render_header().as_bytes())?;
            }

            let mut written = 0usize;
            loop {
                let batch = match reader.next_batch() {
                    Ok(batch) if batch.is_empty() => break,
                    Ok(batch) => batch,
                    Err(e) if !e.is_fatal() => {
                        log::warn!("{}", e);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                for record in &batch {
                    writeln!(out, "{}", record)?;
                }
                written += batch.len();
            }
            out.flush()?;

            let stats = reader.close();
            eprintln!("\n=== Read Statistics ===");
            eprintln!("Records parsed:  {}", stats.records);
            eprintln!("Written:         {}", written);
            eprintln!("Filtered:        {}", stats.filtered);
            eprintln!("Skipped lines:   {}", stats.skipped);
            eprintln!("Malformed lines: {}", stats.malformed);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Evs { input, output } => {
            let config = ReaderConfig { dialect: Dialect::Evs, batch_size, ..Default::default() };
            let mut reader = open_reader(&input, config)?;
            let mut out = create_output(output.as_deref())?;
            writeln!(out, "chromosome\tposition\tref\talt\tmaf\tgenotypes")?;

            let mut with_genotypes = 0usize;
            for record in reader.by_ref() {
                let record = match record {
                    Ok(record) => record,
                    Err(e) if !e.is_fatal() => {
                        log::warn!("{}", e);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                let Some(stats) = record.stats else { continue };
                if !stats.genotypes.is_empty() {
                    with_genotypes += 1;
                }
                let maf = stats.maf.map(|m| format!("{:.6}", m)).unwrap_or_else(|| ".".to_string());
                let genotypes: Vec<String> = stats.genotypes.iter().map(|g| g.to_string()).collect();
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    stats.chrom,
                    stats.pos,
                    stats.ref_allele,
                    stats.alt_alleles.join(","),
                    maf,
                    if genotypes.is_empty() { ".".to_string() } else { genotypes.join(",") }
                )?;
            }
            out.flush()?;

            let stats = reader.close();
            eprintln!("\n=== EVS Statistics ===");
            eprintln!("Variants:        {}", stats.records);
            eprintln!("With genotypes:  {}", with_genotypes);
            eprintln!("Malformed lines: {}", stats.malformed);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Export { input, output } => {
            let config = ReaderConfig { batch_size, ..Default::default() };
            let mut reader = open_reader(&input, config)?;
            let mut sink = TsvSink::new(create_output(Some(&output))?);

            loop {
                let batch = match reader.next_batch() {
                    Ok(batch) if batch.is_empty() => break,
                    Ok(batch) => batch,
                    Err(e) if !e.is_fatal() => {
                        log::warn!("{}", e);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                sink.write_batch(&batch)?;
            }
            sink.finish()?;

            let stats = reader.close();
            eprintln!("\n=== Export Statistics ===");
            eprintln!("Records:         {}", stats.records);
            eprintln!("Sample rows:     {}", sink.rows());
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }
    }

    Ok(())
}
