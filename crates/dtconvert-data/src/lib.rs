//! Tabular data codecs and built-in converters for dtconvert.
//!
//! All four codecs read into and write from the same [`Table`]:
//!
//! - [`csv`] - comma-separated values
//! - [`json`] - an array of flat objects
//! - [`yaml`] - a flat list of records
//! - [`sql`] - `INSERT` statements
//!
//! Every value is text; numbers and booleans are not typed.

pub mod csv;
pub mod json;
pub mod sql;
pub mod tokens;
pub mod yaml;

mod converters;
mod error;
mod scan;
mod table;

pub use converters::{CsvToSql, SqlToCsv, TableConverter, TableFormat, TxtToTokens};
pub use error::CodecError;
pub use sql::SqlOptions;
pub use table::Table;

use dtconvert_core::{ExecutableResolver, ExternalConverter, Registry};
use std::sync::Arc;

/// Settings for the built-in converters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataOptions {
    /// Parameters for `csv -> sql`.
    pub sql: SqlOptions,
}

/// An edge served by an external program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExternalEdge {
    from: &'static str,
    to: &'static str,
    /// Program reference, resolved against the search roots at run time.
    program: &'static str,
    description: &'static str,
    /// The destination is a storage-only target.
    sink: bool,
}

impl ExternalEdge {
    const fn new(from: &'static str, to: &'static str, program: &'static str, description: &'static str) -> Self {
        Self {
            from,
            to,
            program,
            description,
            sink: false,
        }
    }

    const fn sink(mut self) -> Self {
        self.sink = true;
        self
    }

    /// Build the converter for this edge.
    fn converter(&self, resolver: Arc<ExecutableResolver>) -> ExternalConverter {
        let converter = ExternalConverter::new(self.from, self.to, self.program, resolver)
            .description(self.description);
        if self.sink { converter.sink() } else { converter }
    }
}

/// Document converters, registered ahead of the built-ins.
const DOCUMENT_EXTERNALS: &[ExternalEdge] = &[
    ExternalEdge::new("docx", "pdf", "modules/docx_to_pdf.sh", "DOCX to PDF converter"),
    ExternalEdge::new("docx", "odt", "modules/docx_to_odt.sh", "DOCX to ODT converter"),
    ExternalEdge::new("odt", "pdf", "modules/odt_to_pdf.sh", "ODT to PDF converter"),
    ExternalEdge::new("odt", "docx", "modules/odt_to_docx.sh", "ODT to DOCX converter"),
    ExternalEdge::new("txt", "pdf", "modules/txt_to_pdf.sh", "Text to PDF converter"),
    ExternalEdge::new("csv", "txt", "modules/csv_to_txt.sh", "CSV to Text converter"),
    ExternalEdge::new("csv", "pdf", "modules/csv_to_pdf.sh", "CSV to PDF converter"),
    ExternalEdge::new("csv", "xlsx", "modules/csv_to_xlsx.sh", "CSV to XLSX converter"),
    ExternalEdge::new("xlsx", "csv", "modules/xlsx_to_csv.sh", "XLSX to CSV converter"),
];

/// Storage adapters, registered after the built-ins.
const STORAGE_EXTERNALS: &[ExternalEdge] = &[
    ExternalEdge::new(
        "csv",
        "postgresql",
        "modules/csv_to_postgresql.sh",
        "CSV to PostgreSQL importer",
    )
    .sink(),
    ExternalEdge::new(
        "postgresql",
        "csv",
        "modules/postgresql_to_csv.sh",
        "PostgreSQL to CSV exporter",
    ),
];

/// Register the built-in converters.
pub fn register_all(registry: &mut Registry, options: &DataOptions) {
    use TableFormat::*;

    for (from, to) in [
        (Csv, Json),
        (Json, Csv),
        (Json, Yaml),
        (Yaml, Json),
        (Csv, Yaml),
        (Yaml, Csv),
    ] {
        registry.register(TableConverter::new(from, to));
    }

    registry.register(CsvToSql::new(options.sql.clone()));
    registry.register(SqlToCsv::new());
    registry.register(TxtToTokens::new());
}

/// Register the standard converter set.
///
/// With a resolver, the default external edges are registered around the
/// built-ins: document converters first, storage adapters last. Without
/// one, only the built-ins are registered.
pub fn register_defaults(
    registry: &mut Registry,
    options: &DataOptions,
    resolver: Option<Arc<ExecutableResolver>>,
) {
    if let Some(resolver) = &resolver {
        for edge in DOCUMENT_EXTERNALS {
            registry.register(edge.converter(resolver.clone()));
        }
    }

    register_all(registry, options);

    if let Some(resolver) = &resolver {
        for edge in STORAGE_EXTERNALS {
            registry.register(edge.converter(resolver.clone()));
        }
    }
}
