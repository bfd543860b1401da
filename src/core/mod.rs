//! Core building blocks
//!
//! Error types, input stream handling and record filter combinators shared
//! by the format layer.

pub mod error;
pub mod filter;
pub mod io;

pub use error::{Result, VcfError, STREAM_ORIGIN};
pub use filter::{filters, FilterChain, RecordPredicate};
pub use io::{
    detect_compression, open_source, CompressionFormat, LineReader, DEFAULT_BUFFER_SIZE,
};
