//! Character cursor shared by the hand-written readers.

/// A position in a source string, tracking the current line.
///
/// `\n`, `\r\n` and a bare `\r` each count as one line break.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self { src, pos: 0, line: 1 }
    }

    /// 1-based line of the next character.
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' || (ch == '\r' && self.peek() != Some('\n')) {
            self.line += 1;
        }
        Some(ch)
    }

    /// Consume `ch` if it is next.
    pub(crate) fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn skip_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    pub(crate) fn skip_whitespace(&mut self) {
        self.skip_while(char::is_whitespace);
    }

    /// Consume and return the longest prefix whose characters satisfy `pred`.
    pub(crate) fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        self.skip_while(pred);
        &self.src[start..self.pos]
    }

    /// Consume `keyword` if it is next, ignoring ASCII case.
    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.rest().get(..keyword.len()) {
            Some(head) if head.eq_ignore_ascii_case(keyword) => {
                for _ in keyword.chars() {
                    self.bump();
                }
                true
            }
            _ => false,
        }
    }

    /// Consume one line terminator (`\n`, `\r\n` or `\r`).
    pub(crate) fn eat_newline(&mut self) -> bool {
        match self.peek() {
            Some('\n') => {
                self.bump();
                true
            }
            Some('\r') => {
                self.bump();
                self.eat('\n');
                true
            }
            _ => false,
        }
    }

    /// Describe the next character for error messages.
    pub(crate) fn found(&self) -> String {
        match self.peek() {
            Some(ch) => format!("'{}'", ch.escape_default()),
            None => "end of input".to_string(),
        }
    }
}
