//! YAML reader and writer for a flat list of records.
//!
//! ```yaml
//! - name: "Alice"
//!   age: "30"
//! ```
//!
//! Only this shape is supported: `- ` starts a record (optionally with
//! its first `key: value` inline), each further line holds one
//! `key: value`. Blank lines and `#` comments are ignored.

use crate::error::CodecError;
use crate::table::Table;

const FORMAT: &str = "YAML";

pub fn parse(input: &str) -> Result<Table, CodecError> {
    let mut table = Table::new();
    let mut current = None;

    for (index, raw) in input.lines().enumerate() {
        let mut line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let item = if line == "-" {
            Some("")
        } else {
            line.strip_prefix("- ")
        };
        if let Some(rest) = item {
            current = Some(table.add_row());
            line = rest.trim_start();
        }

        let Some(row) = current else {
            return Err(CodecError::syntax(
                FORMAT,
                index + 1,
                "expected '- ' to start a record",
            ));
        };
        // Lines without a key (such as `- {}`) carry no values.
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        table.set(row, key.trim_end(), parse_value(value));
    }

    tracing::debug!(columns = table.column_count(), rows = table.len(), "parsed YAML");
    Ok(table)
}

/// A double-quoted or bare scalar. Text after the closing quote is ignored.
fn parse_value(raw: &str) -> String {
    let raw = raw.trim();
    let Some(quoted) = raw.strip_prefix('"') else {
        return raw.to_string();
    };

    let mut out = String::new();
    let mut chars = quoted.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => break,
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            c => out.push(c),
        }
    }
    out
}

/// Render a table as a record list. Values are always double-quoted.
pub fn write(table: &Table) -> String {
    let columns: Vec<&str> = table.columns().collect();
    let mut out = String::new();

    for row in table.rows() {
        if columns.is_empty() {
            out.push_str("- {}\n");
            continue;
        }
        for (c, (name, value)) in columns.iter().zip(row).enumerate() {
            out.push_str(if c == 0 { "- " } else { "  " });
            out.push_str(name);
            out.push_str(": ");
            quote_into(&mut out, value);
            out.push('\n');
        }
    }
    out
}

fn quote_into(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}
