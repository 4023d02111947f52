//! CSV reader and writer.
//!
//! Reading is permissive: blank lines are skipped, `\n`, `\r\n` and `\r`
//! all end a record, and records shorter or longer than the header are
//! padded or truncated. Writing is strict RFC 4180.

use crate::error::CodecError;
use crate::scan::Cursor;
use crate::table::Table;

const FORMAT: &str = "CSV";

/// Parse CSV text into a table.
///
/// Header names are trimmed. Duplicate header names share one column and
/// the later field in a record wins.
pub fn parse(input: &str) -> Result<Table, CodecError> {
    let mut cur = Cursor::new(input);

    skip_blank_lines(&mut cur);
    if cur.is_eof() {
        return Err(CodecError::EmptyHeader);
    }

    let header: Vec<String> = read_record(&mut cur)?
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect();

    let mut table = Table::new();
    for name in &header {
        table.ensure_column(name);
    }

    loop {
        skip_blank_lines(&mut cur);
        if cur.is_eof() {
            break;
        }
        let line = cur.line();
        let fields = read_record(&mut cur)?;
        if fields.len() > header.len() {
            tracing::trace!(line, extra = fields.len() - header.len(), "dropping extra fields");
        }

        let row = table.add_row();
        for (name, value) in header.iter().zip(fields) {
            table.set(row, name, value);
        }
    }

    tracing::debug!(columns = table.column_count(), rows = table.len(), "parsed CSV");
    Ok(table)
}

/// Render a table as CSV. Every record ends with `\n`.
pub fn write(table: &Table) -> String {
    let mut out = String::new();
    write_record(&mut out, table.columns());
    for row in table.rows() {
        write_record(&mut out, row.iter().map(String::as_str));
    }
    out
}

/// Skip lines holding nothing but spaces and tabs, including such a tail
/// at end of input.
fn skip_blank_lines(cur: &mut Cursor<'_>) {
    loop {
        let mark = *cur;
        cur.skip_while(|c| c == ' ' || c == '\t');
        if cur.eat_newline() {
            continue;
        }
        if !cur.is_eof() {
            *cur = mark;
        }
        return;
    }
}

/// Read one record and its line terminator.
fn read_record(cur: &mut Cursor<'_>) -> Result<Vec<String>, CodecError> {
    let mut fields = Vec::new();
    loop {
        fields.push(read_field(cur)?);
        if !cur.eat(',') {
            cur.eat_newline();
            return Ok(fields);
        }
    }
}

fn read_field(cur: &mut Cursor<'_>) -> Result<String, CodecError> {
    let mut field = String::new();

    if cur.peek() == Some('"') {
        let start = cur.line();
        cur.bump();
        loop {
            match cur.bump() {
                None => {
                    return Err(CodecError::syntax(FORMAT, start, "unterminated quoted field"));
                }
                Some('"') if cur.eat('"') => field.push('"'),
                Some('"') => break,
                Some(ch) => field.push(ch),
            }
        }
        // Text between the closing quote and the delimiter is kept.
        cur.skip_while(|c| c == ' ' || c == '\t');
    }

    field.push_str(cur.take_while(|c| !matches!(c, ',' | '\n' | '\r')));
    Ok(field)
}

fn write_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_field(out, field);
    }
    out.push('\n');
}

fn write_field(out: &mut String, field: &str) {
    if !field.contains([',', '"', '\n', '\r']) {
        out.push_str(field);
        return;
    }
    out.push('"');
    for ch in field.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(table: &Table, index: usize) -> Vec<&str> {
        table.row(index).unwrap().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_basic() {
        let table = parse("name,age\nAlice,30\nBob,25\n").unwrap();
        assert_eq!(table.columns().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(row(&table, 0), vec!["Alice", "30"]);
        assert_eq!(row(&table, 1), vec!["Bob", "25"]);
    }

    #[test]
    fn test_ragged_rows() {
        let table = parse("a,b,c\n1,2\n1,2,3,4\n").unwrap();
        assert_eq!(row(&table, 0), vec!["1", "2", ""]);
        assert_eq!(row(&table, 1), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_empty_fields_are_positional() {
        let table = parse("a,b,c\n1,,3\n,,\n").unwrap();
        assert_eq!(row(&table, 0), vec!["1", "", "3"]);
        assert_eq!(row(&table, 1), vec!["", "", ""]);
    }

    #[test]
    fn test_quoted_fields() {
        let table = parse("a,b\n\"x, \"\"y\"\"\",\"multi\nline\"\n").unwrap();
        assert_eq!(row(&table, 0), vec!["x, \"y\"", "multi\nline"]);
    }

    #[test]
    fn test_line_endings_and_blank_lines() {
        let table = parse("\n  \na,b\r\n1,2\r\n \t\r\n3,4\r5,6").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(row(&table, 1), vec!["3", "4"]);
        assert_eq!(row(&table, 2), vec!["5", "6"]);
    }

    #[test]
    fn test_header_trimmed_and_duplicates_collapse() {
        let table = parse(" a , b ,a\n1,2,3\n").unwrap();
        assert_eq!(table.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(row(&table, 0), vec!["3", "2"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), Err(CodecError::EmptyHeader));
        assert_eq!(parse("\n \t\n  "), Err(CodecError::EmptyHeader));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse("a\n\"open\n").unwrap_err();
        assert!(matches!(err, CodecError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_write_quotes_only_when_needed() {
        let table = Table::from_parts(["v"], vec![vec!["a,\"b\""], vec!["plain"], vec!["x\ny"]]);
        assert_eq!(write(&table), "v\n\"a,\"\"b\"\"\"\nplain\n\"x\ny\"\n");
    }

    #[test]
    fn test_round_trip() {
        let table = Table::from_parts(
            ["id", "text", "note"],
            vec![
                vec!["1", "a,\"b\"", "line\nbreak"],
                vec!["2", "", "crlf\r\ninside"],
                vec!["3", "ünïcödé", "  padded  "],
            ],
        );
        assert_eq!(parse(&write(&table)).unwrap(), table);
    }
}
