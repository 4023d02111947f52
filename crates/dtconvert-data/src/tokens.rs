//! Plain-text tokenizer.

/// Split text into tokens.
///
/// A run of ASCII letters, digits and `_` is one token. Any other
/// non-whitespace character is a token by itself.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }
        let mut end = start + ch.len_utf8();
        if is_word(ch) {
            while let Some(&(i, next)) = chars.peek() {
                if !is_word(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
        }
        tokens.push(&text[start..end]);
    }
    tokens
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// One token per line.
pub fn write_lines(tokens: &[&str]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(token);
        out.push('\n');
    }
    out
}

/// A pretty-printed JSON array of strings.
pub fn write_json(tokens: &[&str]) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(tokens)?;
    out.push('\n');
    Ok(out)
}
