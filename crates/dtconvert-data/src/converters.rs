//! Built-in converters wrapping the codecs.

use crate::error::CodecError;
use crate::sql::{self, SqlOptions};
use crate::table::Table;
use crate::{csv, json, tokens, yaml};
use dtconvert_core::{ConvertError, Converter, ConverterDecl};
use std::path::Path;

/// Read a file as text, replacing invalid UTF-8.
pub(crate) fn read_text(path: &Path) -> Result<String, ConvertError> {
    let bytes = std::fs::read(path).map_err(|e| ConvertError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub(crate) fn write_text(path: &Path, text: &str) -> Result<(), ConvertError> {
    std::fs::write(path, text).map_err(|e| ConvertError::io(path, e))
}

/// One of the table encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
    Yaml,
}

impl TableFormat {
    pub fn name(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Json => "json",
            TableFormat::Yaml => "yaml",
        }
    }

    pub fn parse(self, input: &str) -> Result<Table, CodecError> {
        match self {
            TableFormat::Csv => csv::parse(input),
            TableFormat::Json => json::parse(input),
            TableFormat::Yaml => yaml::parse(input),
        }
    }

    pub fn write(self, table: &Table) -> String {
        match self {
            TableFormat::Csv => csv::write(table),
            TableFormat::Json => json::write(table),
            TableFormat::Yaml => yaml::write(table),
        }
    }
}

/// Converts between two table encodings through a [`Table`].
pub struct TableConverter {
    decl: ConverterDecl,
    from: TableFormat,
    to: TableFormat,
}

impl TableConverter {
    pub fn new(from: TableFormat, to: TableFormat) -> Self {
        let id = format!("data.{}-to-{}", from.name(), to.name());
        let decl = ConverterDecl::new(&id, from.name(), to.name()).description(format!(
            "{} to {} converter",
            from.name().to_uppercase(),
            to.name().to_uppercase()
        ));
        Self { decl, from, to }
    }
}

impl Converter for TableConverter {
    fn decl(&self) -> &ConverterDecl {
        &self.decl
    }

    fn run(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        let table = self.from.parse(&read_text(input)?)?;
        write_text(output, &self.to.write(&table))
    }
}

/// CSV to an INSERT dump.
pub struct CsvToSql {
    decl: ConverterDecl,
    options: SqlOptions,
}

impl CsvToSql {
    pub fn new(options: SqlOptions) -> Self {
        Self {
            decl: ConverterDecl::new("sql.csv-to-sql", "csv", "sql")
                .description("CSV to SQL converter"),
            options,
        }
    }
}

impl Converter for CsvToSql {
    fn decl(&self) -> &ConverterDecl {
        &self.decl
    }

    fn run(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        let table = csv::parse(&read_text(input)?)?;
        let sql = sql::table_to_sql(&table, &self.options)?;
        write_text(output, &sql)
    }
}

/// An INSERT dump back to CSV.
pub struct SqlToCsv {
    decl: ConverterDecl,
}

impl SqlToCsv {
    pub fn new() -> Self {
        Self {
            decl: ConverterDecl::new("sql.sql-to-csv", "sql", "csv")
                .description("SQL to CSV converter"),
        }
    }
}

impl Default for SqlToCsv {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for SqlToCsv {
    fn decl(&self) -> &ConverterDecl {
        &self.decl
    }

    fn run(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        let table = sql::parse_inserts(&read_text(input)?)?;
        write_text(output, &csv::write(&table))
    }
}

/// Text to a token list; JSON output when the output path ends in `.json`.
pub struct TxtToTokens {
    decl: ConverterDecl,
}

impl TxtToTokens {
    pub fn new() -> Self {
        Self {
            decl: ConverterDecl::new("text.txt-to-tokens", "txt", "tokens")
                .description("Text to tokens converter"),
        }
    }
}

impl Default for TxtToTokens {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for TxtToTokens {
    fn decl(&self) -> &ConverterDecl {
        &self.decl
    }

    fn run(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        let text = read_text(input)?;
        let tokens = tokens::tokenize(&text);

        let as_json = output
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let rendered = if as_json {
            tokens::write_json(&tokens).map_err(|e| ConvertError::Other(Box::new(e)))?
        } else {
            tokens::write_lines(&tokens)
        };
        write_text(output, &rendered)
    }
}
