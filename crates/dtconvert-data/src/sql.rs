//! SQL `INSERT` dumps.
//!
//! Generation writes one `INSERT INTO <table> (<cols>) VALUES (...);` per
//! row with every value as a single-quoted literal. Parsing reads back only
//! that shape, one statement per line.

use crate::error::CodecError;
use crate::scan::Cursor;
use crate::table::Table;

/// Table name used when none is configured.
pub const DEFAULT_TABLE: &str = "data";

/// First line of every generated dump.
pub const HEADER_COMMENT: &str = "-- Generated by dtconvert (csv -> sql)";

/// Options for SQL generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlOptions {
    /// Target table identifier.
    pub table: String,
    /// Emit `CREATE TABLE IF NOT EXISTS` before the inserts.
    pub create_table: bool,
}

impl Default for SqlOptions {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            create_table: false,
        }
    }
}

impl SqlOptions {
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn create_table(mut self, create: bool) -> Self {
        self.create_table = create;
        self
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(is_identifier_char)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Generate an INSERT dump for `table`.
///
/// Column names are trimmed and an empty name becomes `col<N>` (1-based
/// position). Every resulting name, and the table name, must be a valid
/// identifier.
pub fn table_to_sql(table: &Table, options: &SqlOptions) -> Result<String, CodecError> {
    if !is_identifier(&options.table) {
        return Err(CodecError::InvalidIdentifier(options.table.clone()));
    }
    if table.column_count() == 0 {
        return Err(CodecError::EmptyHeader);
    }

    let columns = table
        .columns()
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim();
            let name = if name.is_empty() {
                format!("col{}", i + 1)
            } else {
                name.to_string()
            };
            if is_identifier(&name) {
                Ok(name)
            } else {
                Err(CodecError::InvalidIdentifier(name))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    let column_list = columns.join(", ");

    let mut out = String::new();
    out.push_str(HEADER_COMMENT);
    out.push('\n');

    if options.create_table {
        let defs: Vec<String> = columns.iter().map(|c| format!("{c} TEXT")).collect();
        out.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({});\n",
            options.table,
            defs.join(", ")
        ));
    }

    for (index, row) in table.rows().iter().enumerate() {
        if row.iter().any(|v| v.contains(['\n', '\r'])) {
            tracing::warn!(
                row = index + 1,
                "value contains a line break; the INSERT spans lines and will not read back"
            );
        }
        let values: Vec<String> = row.iter().map(|v| quote_literal(v)).collect();
        out.push_str(&format!(
            "INSERT INTO {} ({}) VALUES ({});\n",
            options.table,
            column_list,
            values.join(", ")
        ));
    }

    out.push('\n');
    Ok(out)
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

struct Insert {
    columns: Vec<String>,
    values: Vec<String>,
}

/// Rebuild a table from `INSERT` statements.
///
/// Blank lines, lines starting with `-` and lines that are not a
/// single-line INSERT of quoted literals are skipped. Every INSERT must
/// name the same columns in the same order. Missing trailing values are
/// empty; extra values are dropped.
pub fn parse_inserts(input: &str) -> Result<Table, CodecError> {
    let mut table = Table::new();
    let mut columns: Option<Vec<String>> = None;

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let text = line.trim_start();
        if text.is_empty() || text.starts_with('-') {
            continue;
        }

        let Some(insert) = parse_insert(text) else {
            tracing::debug!(line = line_no, "skipping line that is not an INSERT");
            continue;
        };

        match &columns {
            Some(first) if *first != insert.columns => {
                return Err(CodecError::MixedColumns { line: line_no });
            }
            Some(_) => {}
            None => {
                for name in &insert.columns {
                    table.ensure_column(name);
                }
                columns = Some(insert.columns.clone());
            }
        }

        let row = table.add_row();
        for (name, value) in insert.columns.iter().zip(insert.values) {
            table.set(row, name, value);
        }
    }

    if columns.is_none() {
        return Err(CodecError::NoInserts);
    }
    tracing::debug!(columns = table.column_count(), rows = table.len(), "parsed INSERT dump");
    Ok(table)
}

/// `INSERT INTO <ident> (<ident>, ...) VALUES ('...', ...);`
fn parse_insert(line: &str) -> Option<Insert> {
    let mut cur = Cursor::new(line);

    keyword(&mut cur, "insert")?;
    keyword(&mut cur, "into")?;
    identifier(&mut cur)?;

    punct(&mut cur, '(')?;
    let mut columns = Vec::new();
    loop {
        columns.push(identifier(&mut cur)?.to_string());
        if punct(&mut cur, ')').is_some() {
            break;
        }
        punct(&mut cur, ',')?;
    }

    keyword(&mut cur, "values")?;
    punct(&mut cur, '(')?;
    let mut values = Vec::new();
    loop {
        values.push(literal(&mut cur)?);
        if punct(&mut cur, ')').is_some() {
            break;
        }
        punct(&mut cur, ',')?;
    }

    Some(Insert { columns, values })
}

fn keyword(cur: &mut Cursor<'_>, word: &str) -> Option<()> {
    cur.skip_whitespace();
    if !cur.eat_keyword(word) || cur.peek().is_some_and(is_identifier_char) {
        return None;
    }
    Some(())
}

fn identifier<'a>(cur: &mut Cursor<'a>) -> Option<&'a str> {
    cur.skip_whitespace();
    if !cur
        .peek()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    {
        return None;
    }
    Some(cur.take_while(is_identifier_char))
}

fn punct(cur: &mut Cursor<'_>, ch: char) -> Option<()> {
    cur.skip_whitespace();
    cur.eat(ch).then_some(())
}

fn literal(cur: &mut Cursor<'_>) -> Option<String> {
    cur.skip_whitespace();
    if !cur.eat('\'') {
        return None;
    }
    let mut out = String::new();
    while let Some(ch) = cur.bump() {
        if ch == '\'' && !cur.eat('\'') {
            return Some(out);
        }
        out.push(ch);
    }
    // Unterminated literal: take what is there.
    Some(out)
}
