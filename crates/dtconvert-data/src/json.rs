//! JSON reader and writer for arrays of flat objects.
//!
//! Every value becomes text. Strings are unescaped; other scalars
//! (numbers, `true`, `false`, `null`) are copied as written. `\uXXXX`
//! escapes are read as a `?` placeholder.

use crate::error::CodecError;
use crate::scan::Cursor;
use crate::table::Table;

const FORMAT: &str = "JSON";

/// Parse `[ {"k": v, ...}, ... ]` into a table.
///
/// Keys become columns in first-seen order; a key first seen in a later
/// object widens the earlier rows with empty values.
pub fn parse(input: &str) -> Result<Table, CodecError> {
    let mut parser = Parser {
        cur: Cursor::new(input),
    };
    let mut table = Table::new();

    parser.expect('[')?;
    if parser.eat(']') {
        return Ok(table);
    }

    loop {
        parser.expect('{')?;
        let row = table.add_row();

        if !parser.eat('}') {
            loop {
                let key = parser.string()?;
                parser.expect(':')?;
                let value = parser.scalar()?;
                table.set(row, &key, value);

                if parser.eat('}') {
                    break;
                }
                parser.expect(',')?;
            }
        }

        if parser.eat(']') {
            break;
        }
        parser.expect(',')?;
    }

    tracing::debug!(columns = table.column_count(), rows = table.len(), "parsed JSON");
    Ok(table)
}

/// Render a table as a pretty-printed array, one object per line.
pub fn write(table: &Table) -> String {
    let columns: Vec<&str> = table.columns().collect();
    let mut out = String::from("[\n");

    for (r, row) in table.rows().iter().enumerate() {
        out.push_str("  {");
        for (c, (name, value)) in columns.iter().zip(row).enumerate() {
            if c > 0 {
                out.push_str(", ");
            }
            escape_into(&mut out, name);
            out.push_str(": ");
            escape_into(&mut out, value);
        }
        out.push('}');
        if r + 1 < table.len() {
            out.push(',');
        }
        out.push('\n');
    }

    out.push_str("]\n");
    out
}

/// Append `s` as a quoted JSON string.
fn escape_into(out: &mut String, s: &str) {
    out.push_str(&serde_json::Value::from(s).to_string());
}

struct Parser<'a> {
    cur: Cursor<'a>,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> CodecError {
        CodecError::syntax(FORMAT, self.cur.line(), message)
    }

    fn eat(&mut self, ch: char) -> bool {
        self.cur.skip_whitespace();
        self.cur.eat(ch)
    }

    fn expect(&mut self, ch: char) -> Result<(), CodecError> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}', found {}", ch, self.cur.found())))
        }
    }

    fn string(&mut self) -> Result<String, CodecError> {
        self.cur.skip_whitespace();
        if !self.cur.eat('"') {
            return Err(self.error(format!("expected string, found {}", self.cur.found())));
        }

        let mut out = String::new();
        loop {
            match self.cur.bump() {
                None => return Err(self.error("unterminated string")),
                Some('"') => return Ok(out),
                Some('\\') => {
                    let escaped = match self.cur.bump() {
                        None => return Err(self.error("unterminated string")),
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('b') => '\u{08}',
                        Some('f') => '\u{0c}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('u') => {
                            for _ in 0..4 {
                                if !self.cur.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                                    break;
                                }
                                self.cur.bump();
                            }
                            '?'
                        }
                        Some(other) => {
                            return Err(self.error(format!(
                                "unsupported escape '\\{}'",
                                other.escape_default()
                            )));
                        }
                    };
                    out.push(escaped);
                }
                Some(ch) => out.push(ch),
            }
        }
    }

    /// A value as text: a string, or a bare token up to the next
    /// delimiter or whitespace.
    fn scalar(&mut self) -> Result<String, CodecError> {
        self.cur.skip_whitespace();
        match self.cur.peek() {
            Some('"') => self.string(),
            Some('{') | Some('[') => Err(self.error("nested values are not supported")),
            _ => Ok(self
                .cur
                .take_while(|c| !matches!(c, ',' | '}' | ']') && !c.is_whitespace())
                .to_string()),
        }
    }
}
