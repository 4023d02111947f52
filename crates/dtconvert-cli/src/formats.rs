//! Format names: aliases, extension detection and descriptions.

use std::path::Path;

/// Alternative spellings accepted for `--from` and `--to`.
const ALIASES: &[(&str, &str)] = &[
    ("yml", "yaml"),
    ("excel", "xlsx"),
    ("pg", "postgresql"),
    ("postgres", "postgresql"),
];

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("pdf", "Portable Document Format"),
    ("docx", "Microsoft Word Document"),
    ("txt", "Plain Text File"),
    ("csv", "Comma Separated Values"),
    ("json", "JavaScript Object Notation"),
    ("yaml", "YAML Ain't Markup Language"),
    ("sql", "SQL (INSERT statements)"),
    ("odt", "OpenDocument Text"),
    ("xlsx", "Microsoft Excel Spreadsheet"),
    ("tokens", "Tokenized text (for ML/AI)"),
    ("postgresql", "PostgreSQL (import/store)"),
    ("html", "HyperText Markup Language"),
    ("md", "Markdown Document"),
];

/// Lower-case a format name and resolve aliases.
pub fn canonical(name: &str) -> String {
    let name = name.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, format)| format.to_string())
        .unwrap_or(name)
}

/// The canonical format named by an alias, if `name` is one.
pub fn alias_target(name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, format)| *format)
}

/// Format from the file extension.
pub fn detect(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if ext.is_empty() {
        return None;
    }
    Some(canonical(ext))
}

pub fn description(format: &str) -> &'static str {
    DESCRIPTIONS
        .iter()
        .find(|(name, _)| *name == format)
        .map(|(_, desc)| *desc)
        .unwrap_or("Unknown Format")
}

/// `input` with its extension replaced by `format`.
pub fn default_output(input: &Path, format: &str) -> std::path::PathBuf {
    input.with_extension(format)
}
