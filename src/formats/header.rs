//! VCF header model and parser
//!
//! Consumes the leading `#`-prefixed lines of a VCF file and builds typed
//! definition tables (INFO/FILTER/FORMAT/ALT), free-form meta information,
//! the file format tag and the `#CHROM` column line. The header can be
//! rendered back to text for pass-through pipelines.
//!
//! Dispatch order per line (first match wins):
//!
//! ```text
//! ##fileformat=   -> file format tag (mandatory, must have a value)
//! ##INFO=<...>    -> info definitions
//! ##FILTER=<...>  -> filter definitions
//! ##FORMAT=<...>  -> format definitions
//! ##ALT=<...>     -> alt definitions
//! #CHROM ...      -> column line, sample names
//! ##KEY=VALUE     -> meta information (lines without '=' are skipped)
//! ```

use crate::core::error::{Result, VcfError, STREAM_ORIGIN};
use crate::core::io::LineReader;
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::HashSet;
use std::fmt;
use std::io::BufRead;
use std::sync::Arc;

/// The eight mandatory columns plus FORMAT
pub const FIXED_COLUMNS: [&str; 9] = [
    "CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT",
];

/// Kind of a bracketed header definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Info,
    Filter,
    Format,
    Alt,
}

impl DefinitionKind {
    /// Header key as written after `##`
    pub fn tag(&self) -> &'static str {
        match self {
            DefinitionKind::Info => "INFO",
            DefinitionKind::Filter => "FILTER",
            DefinitionKind::Format => "FORMAT",
            DefinitionKind::Alt => "ALT",
        }
    }

    /// Whether the definition carries Number/Type fields
    pub fn is_typed(&self) -> bool {
        matches!(self, DefinitionKind::Info | DefinitionKind::Format)
    }
}

/// A bracketed `##INFO`, `##FILTER`, `##FORMAT` or `##ALT` definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDefinition {
    pub kind: DefinitionKind,
    pub id: String,
    /// Number of values ("1", "A", "R", "G", "."); INFO/FORMAT only
    pub number: Option<String>,
    /// Value type ("Integer", "Float", "Flag", ...); INFO/FORMAT only
    pub field_type: Option<String>,
    pub description: Option<String>,
    /// Any other keys inside `<...>` (Source, Version, ...), in input order
    pub extra: Vec<(String, String)>,
}

impl HeaderDefinition {
    /// Parse a full definition line such as `##INFO=<ID=DP,Number=1,...>`
    pub fn parse(kind: DefinitionKind, line: &str) -> std::result::Result<Self, String> {
        let prefix = format!("##{}=", kind.tag());
        let rest = line
            .strip_prefix(prefix.as_str())
            .ok_or_else(|| format!("expected prefix '{}'", prefix))?;
        let inner = rest
            .trim()
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .ok_or_else(|| format!("{} definition is not enclosed in <...>", kind.tag()))?;

        let mut id = None;
        let mut number = None;
        let mut field_type = None;
        let mut description = None;
        let mut extra = Vec::new();

        for (key, value) in split_definition_fields(inner) {
            match key.as_str() {
                "ID" => id = Some(value),
                "Number" if kind.is_typed() => number = Some(value),
                "Type" if kind.is_typed() => field_type = Some(value),
                "Description" => description = Some(value),
                _ => extra.push((key, value)),
            }
        }

        let id = id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| format!("{} definition has no ID", kind.tag()))?;

        Ok(Self {
            kind,
            id,
            number,
            field_type,
            description,
            extra,
        })
    }
}

impl fmt::Display for HeaderDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "##{}=<ID={}", self.kind.tag(), self.id)?;
        if let Some(number) = &self.number {
            write!(f, ",Number={}", number)?;
        }
        if let Some(field_type) = &self.field_type {
            write!(f, ",Type={}", field_type)?;
        }
        if let Some(description) = &self.description {
            write!(f, ",Description=\"{}\"", escape_quotes(description))?;
        }
        for (key, value) in &self.extra {
            if needs_quoting(value) {
                write!(f, ",{}=\"{}\"", key, escape_quotes(value))?;
            } else {
                write!(f, ",{}={}", key, value)?;
            }
        }
        write!(f, ">")
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| matches!(c, ',' | '=' | '<' | '>' | '"') || c.is_whitespace())
}

fn escape_quotes(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Split the content of `<...>` into key/value pairs
///
/// Quoted values are kept verbatim apart from the `\"` and `\\` escapes, and
/// may contain commas and `=`. Unquoted values are trimmed.
fn split_definition_fields(inner: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            chars.next();
            if c == '=' {
                break;
            }
            key.push(c);
        }
        let key = key.trim().to_string();
        if key.is_empty() && chars.peek().is_none() {
            break;
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => match chars.peek() {
                        Some(&escaped @ ('"' | '\\')) => {
                            chars.next();
                            value.push(escaped);
                        }
                        _ => value.push(c),
                    },
                    '"' => break,
                    _ => value.push(c),
                }
            }
            // Skip anything up to the separating comma
            for c in chars.by_ref() {
                if c == ',' {
                    break;
                }
            }
        } else {
            for c in chars.by_ref() {
                if c == ',' {
                    break;
                }
                value.push(c);
            }
            value = value.trim().to_string();
        }

        if !key.is_empty() {
            fields.push((key, value));
        }
        if chars.peek().is_none() {
            break;
        }
    }

    fields
}

/// Immutable sample name -> sample column mapping shared by all records of a file
///
/// Positions index into a record's per-sample data (0 = first sample column).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleIndex {
    positions: IndexMap<String, usize>,
}

impl SampleIndex {
    /// Build an index from sample names in column order
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut positions = IndexMap::new();
        for (i, name) in names.into_iter().enumerate() {
            // A repeated sample name keeps its first column
            positions.entry(name.into()).or_insert(i);
        }
        Self { positions }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sample names with their positions, in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.positions.iter().map(|(name, &i)| (name.as_str(), i))
    }
}

/// Parsed VCF header
#[derive(Debug, Clone, Default)]
pub struct VcfHeader {
    /// File format tag, e.g. "VCFv4.1"
    pub file_format: String,
    pub info: IndexMap<String, HeaderDefinition>,
    pub filter: IndexMap<String, HeaderDefinition>,
    pub format: IndexMap<String, HeaderDefinition>,
    pub alt: IndexMap<String, HeaderDefinition>,
    /// Free-form `##KEY=VALUE` lines; repeated keys keep every value in order
    pub meta_information: IndexMap<String, Vec<String>>,
    /// Column names from the `#CHROM` line, without the leading '#'
    pub columns: Vec<String>,
    sample_index: Arc<SampleIndex>,
}

impl VcfHeader {
    /// Read header lines from `lines`, stopping before the first data line
    ///
    /// The first non-`#` line is pushed back so the record reader sees it.
    pub fn read_from<R: BufRead>(lines: &mut LineReader<R>, origin: &str) -> Result<Self> {
        let mut header = VcfHeader::default();
        let mut file_format_seen = false;
        let mut columns_seen = false;

        loop {
            let line_number = lines.line_number() + 1;
            let line = match lines.next_line()? {
                Some(line) => line,
                None => break,
            };

            if line.trim().is_empty() {
                continue;
            }
            if !line.starts_with('#') {
                let data_line = line.to_string();
                lines.push_back(data_line);
                break;
            }

            if line.starts_with("##fileformat") {
                let value = line
                    .split_once('=')
                    .map(|(_, v)| v.trim())
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| {
                        VcfError::malformed_header(origin, line_number, "##fileformat has no value")
                    })?;
                header.file_format = value.to_string();
                file_format_seen = true;
            } else if line.starts_with("##INFO=") {
                header.insert_definition(DefinitionKind::Info, line, origin, line_number)?;
            } else if line.starts_with("##FILTER=") {
                header.insert_definition(DefinitionKind::Filter, line, origin, line_number)?;
            } else if line.starts_with("##FORMAT=") {
                header.insert_definition(DefinitionKind::Format, line, origin, line_number)?;
            } else if line.starts_with("##ALT=") {
                header.insert_definition(DefinitionKind::Alt, line, origin, line_number)?;
            } else if let Some(columns) = line.strip_prefix("#CHROM") {
                header.columns = std::iter::once("CHROM")
                    .chain(columns.split('\t').skip(1))
                    .map(str::to_string)
                    .collect();
                columns_seen = true;
            } else {
                match line.trim_start_matches('#').split_once('=') {
                    Some((key, value)) => {
                        header
                            .meta_information
                            .entry(key.to_string())
                            .or_default()
                            .push(value.to_string());
                    }
                    None => warn!("{}:{}: skipping meta line without '=': {}", origin, line_number, line),
                }
            }
        }

        if !columns_seen {
            return Err(VcfError::missing_header(origin));
        }
        if !file_format_seen {
            return Err(VcfError::malformed_header(
                origin,
                lines.line_number(),
                "no ##fileformat line",
            ));
        }

        header.sample_index = Arc::new(SampleIndex::new(header.sample_names().iter().cloned()));
        for name in header.duplicate_sample_names() {
            warn!(
                "{}: sample '{}' appears more than once, only its first column is used",
                origin, name
            );
        }
        debug!(
            "{}: header {} with {} INFO, {} FORMAT, {} samples",
            origin,
            header.file_format,
            header.info.len(),
            header.format.len(),
            header.sample_index.len()
        );
        Ok(header)
    }

    /// Parse a header from text (data lines after the header are ignored)
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = LineReader::new(text.as_bytes());
        Self::read_from(&mut lines, STREAM_ORIGIN)
    }

    fn insert_definition(
        &mut self,
        kind: DefinitionKind,
        line: &str,
        origin: &str,
        line_number: usize,
    ) -> Result<()> {
        let definition = HeaderDefinition::parse(kind, line)
            .map_err(|message| VcfError::malformed_header(origin, line_number, message))?;
        let table = match kind {
            DefinitionKind::Info => &mut self.info,
            DefinitionKind::Filter => &mut self.filter,
            DefinitionKind::Format => &mut self.format,
            DefinitionKind::Alt => &mut self.alt,
        };
        table.insert(definition.id.clone(), definition);
        Ok(())
    }

    /// Sample names: the columns after the nine fixed ones
    pub fn sample_names(&self) -> &[String] {
        self.columns.get(FIXED_COLUMNS.len()..).unwrap_or(&[])
    }

    /// Sample names repeating an earlier column; those later columns are not reachable by name
    pub fn duplicate_sample_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.sample_names()
            .iter()
            .map(String::as_str)
            .filter(|name| !seen.insert(*name))
            .collect()
    }

    /// Shared sample index handed to every record of this file
    pub fn sample_index(&self) -> Arc<SampleIndex> {
        Arc::clone(&self.sample_index)
    }

    /// Last value recorded for a meta key
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta_information
            .get(key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Render the header back to VCF text, one line per entry, newline-terminated
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str("##fileformat=");
        out.push_str(&self.file_format);
        out.push('\n');

        for (key, values) in &self.meta_information {
            for value in values {
                out.push_str("##");
                out.push_str(key);
                out.push('=');
                out.push_str(value);
                out.push('\n');
            }
        }

        for table in [&self.alt, &self.filter, &self.info, &self.format] {
            for definition in table.values() {
                out.push_str(&definition.to_string());
                out.push('\n');
            }
        }

        out.push('#');
        out.push_str(&self.columns.join("\t"));
        out.push('\n');
        out
    }
}
