use crate::error::Result;
use crate::matrix::RawMatrix;
use crate::table::Table;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const BOM: char = '\u{feff}';

/// Delimiters recognised when sniffing, in order of preference on a tie
const SNIFF_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_LINES: usize = 10;

/// CSV reader options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter; `None` sniffs it from the first lines of the text
    pub delimiter: Option<u8>,
    /// Quote character (default: '"')
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: None,
            quote: b'"',
        }
    }
}

impl CsvOptions {
    /// Create options for TSV (tab-separated values)
    #[must_use]
    pub fn tsv() -> Self {
        CsvOptions {
            delimiter: Some(b'\t'),
            ..Default::default()
        }
    }

    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// Field delimiter used when exporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delimiter {
    #[default]
    Semicolon,
    Comma,
    Tab,
}

impl Delimiter {
    #[must_use]
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Semicolon => b';',
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }
}

/// CSV export options
#[derive(Debug, Clone)]
pub struct CsvExportOptions {
    /// Field delimiter (default: ';')
    pub delimiter: Delimiter,
    /// Prepend a UTF-8 byte-order mark so spreadsheet applications pick the
    /// right encoding (default: true)
    pub include_bom: bool,
}

impl Default for CsvExportOptions {
    fn default() -> Self {
        CsvExportOptions {
            delimiter: Delimiter::Semicolon,
            include_bom: true,
        }
    }
}

impl CsvExportOptions {
    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to write a byte-order mark
    #[must_use]
    pub fn with_bom(mut self, include_bom: bool) -> Self {
        self.include_bom = include_bom;
        self
    }
}

// ===== Reading =====

/// Decode file bytes as text.
///
/// UTF-8 is tried first; anything else is read as Windows-1251, the usual
/// encoding of legacy Cyrillic spreadsheet exports. A leading BOM is removed.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (decoded, _, had_errors) = encoding_rs::WINDOWS_1251.decode(bytes);
            if had_errors {
                tracing::warn!(
                    "input is neither UTF-8 nor Windows-1251; some characters were replaced"
                );
            }
            decoded
        }
    };

    match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.strip_prefix(BOM).unwrap_or(s)),
        Cow::Owned(s) => match s.strip_prefix(BOM) {
            Some(stripped) => Cow::Owned(stripped.to_string()),
            None => Cow::Owned(s),
        },
    }
}

/// Guess the field delimiter from the first lines of the text.
///
/// Each candidate is scored by its average count per line divided by the
/// spread of those counts, so a delimiter that appears the same number of
/// times on every line wins. Quoted sections are skipped.
#[must_use]
pub fn sniff_delimiter(text: &str, quote: u8) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    if lines.is_empty() {
        return b',';
    }

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    for &delimiter in &SNIFF_CANDIDATES {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_unquoted(line, delimiter, quote))
            .collect();

        let avg = counts.iter().sum::<usize>() as f32 / counts.len() as f32;
        let variance = counts
            .iter()
            .map(|&c| (c as f32 - avg).powi(2))
            .sum::<f32>()
            / counts.len() as f32;
        let score = avg / (1.0 + variance.sqrt());

        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}

fn count_unquoted(line: &str, delimiter: u8, quote: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for byte in line.bytes() {
        if byte == quote {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Tokenize delimited text into a raw matrix.
///
/// Rows keep whatever length they were written with; blank lines are skipped.
pub fn read_matrix(text: &str, options: &CsvOptions) -> Result<RawMatrix> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let delimiter = options
        .delimiter
        .unwrap_or_else(|| sniff_delimiter(text, options.quote));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .quote(options.quote)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut matrix = RawMatrix::new();
    for result in reader.records() {
        let record = result?;
        matrix.push_row(record.iter().map(str::to_string).collect());
    }

    tracing::debug!(
        rows = matrix.row_count(),
        delimiter = %char::from(delimiter).escape_default(),
        "read delimited text"
    );
    Ok(matrix)
}

/// Read and tokenize a delimited text file
pub fn read_matrix_from_path<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<RawMatrix> {
    let bytes = std::fs::read(path.as_ref())?;
    read_matrix(&decode_text(&bytes), options)
}

// ===== Writing =====

/// Write a table as CSV: one header line, then one line per row.
///
/// Lines end with CRLF. A field is quoted, with inner quotes doubled, only
/// when it contains a quote, a line break or the delimiter.
pub fn write_table<W: Write>(
    table: &Table,
    mut writer: W,
    options: &CsvExportOptions,
) -> Result<()> {
    if options.include_bom {
        let mut buf = [0u8; 4];
        writer.write_all(BOM.encode_utf8(&mut buf).as_bytes())?;
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter.as_byte())
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    csv_writer.write_record(table.headers())?;
    for row in table.rows() {
        csv_writer.write_record(row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Render a table as a CSV string
pub fn table_to_csv(table: &Table, options: &CsvExportOptions) -> Result<String> {
    let mut buffer = Vec::new();
    write_table(table, &mut buffer, options)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Save a table to a CSV file
pub fn save_table<P: AsRef<Path>>(
    table: &Table,
    path: P,
    options: &CsvExportOptions,
) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_table(table, BufWriter::new(file), options)
}

/// Default export path for a source file: `<dir>/<stem>.export.csv`
#[must_use]
pub fn export_file_name(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("cardgrid");
    source.with_file_name(format!("{stem}.export.csv"))
}
