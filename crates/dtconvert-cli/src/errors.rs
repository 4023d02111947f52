//! Better error messages with actionable suggestions.

use crate::formats;
use dtconvert_core::Registry;
use std::path::Path;

/// Build an error message for when the source format cannot be detected.
pub fn format_detection_error(path: &Path, registry: &Registry) -> String {
    let mut msg = String::from("Could not detect source format");

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => msg.push_str(&format!(". Unknown extension '.{}'", ext)),
        None => msg.push_str(". No file extension found"),
    }

    msg.push_str(".\n\nUse --from <format> to specify. Supported formats: ");
    msg.push_str(&known_formats(registry).join(", "));
    msg
}

/// Build an error message for a format no converter reads or writes.
pub fn unsupported_format_error(format: &str, registry: &Registry) -> String {
    let mut msg = format!("Unsupported format '{}'", format);

    if let Some(suggestion) = find_similar_format(format, registry) {
        msg.push_str(&format!(".\n\nDid you mean '{}'?", suggestion));
        return msg;
    }

    msg.push_str(".\n\nSupported formats: ");
    msg.push_str(&known_formats(registry).join(", "));
    msg
}

/// Build an error message for when no conversion path is found.
pub fn no_path_error(source_format: &str, target_format: &str, registry: &Registry) -> String {
    let mut msg = format!(
        "No conversion path found from '{}' to '{}'",
        source_format, target_format
    );

    if source_format == target_format {
        msg.push_str(".\n\nSource and target formats are the same.");
        return msg;
    }

    msg.push_str(".\n\n");

    let source_targets = find_reachable_formats(source_format, registry);
    if !source_targets.is_empty() {
        msg.push_str(&format!(
            "'{}' can convert to: {}\n",
            source_format,
            source_targets.join(", ")
        ));
    } else {
        msg.push_str(&format!(
            "'{}' has no registered conversions.\n",
            source_format
        ));
    }

    let target_sources = find_source_formats(target_format, registry);
    if !target_sources.is_empty() {
        msg.push_str(&format!(
            "'{}' can be created from: {}",
            target_format,
            target_sources.join(", ")
        ));
    }

    msg
}

/// Build an error message for a missing input file.
pub fn file_not_found_error(path: &Path) -> String {
    let mut msg = format!("File '{}' does not exist", path.display());

    if let Some(suggestions) = find_similar_files(path) {
        if !suggestions.is_empty() {
            msg.push_str(&format!(".\n\nDid you mean: {}?", suggestions.join(", ")));
        }
    }

    msg
}

/// Build an error message for a sink target without its configuration file.
pub fn sink_config_error(path: &Path, format: &str) -> String {
    format!(
        "Config file '{}' not found or not readable.\n\n\
         A '{}' target writes to storage; -o must name its connection config.",
        path.display(),
        format
    )
}

fn known_formats(registry: &Registry) -> Vec<&str> {
    let mut formats: Vec<&str> = registry.formats().into_iter().collect();
    formats.sort_unstable();
    formats
}

/// Find a similar format name (for typo suggestions).
fn find_similar_format(input: &str, registry: &Registry) -> Option<String> {
    let input = input.to_lowercase();

    if let Some(canonical) = formats::alias_target(&input) {
        if registry.knows_format(canonical) {
            return Some(canonical.to_string());
        }
    }

    registry
        .formats()
        .into_iter()
        .filter(|format| *format != input)
        .map(|format| (levenshtein(&input, format), format))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, format)| format.to_string())
}

/// Simple Levenshtein distance for short strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Formats reachable from `source` in one step.
fn find_reachable_formats<'a>(source: &'a str, registry: &'a Registry) -> Vec<&'a str> {
    let mut targets: Vec<&str> = registry
        .outgoing(source)
        .map(|decl| decl.to.as_str())
        .collect();
    targets.sort_unstable();
    targets.dedup();
    targets
}

/// Formats that convert to `target` in one step.
fn find_source_formats<'a>(target: &'a str, registry: &'a Registry) -> Vec<&'a str> {
    let mut sources: Vec<&str> = registry
        .incoming(target)
        .map(|decl| decl.from.as_str())
        .collect();
    sources.sort_unstable();
    sources.dedup();
    sources
}

/// Find similar files in the same directory (for "did you mean" suggestions).
fn find_similar_files(path: &Path) -> Option<Vec<String>> {
    let filename = path.file_name()?.to_str()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let entries = std::fs::read_dir(parent).ok()?;
    let mut suggestions: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name != filename && levenshtein(filename, name) <= 2)
        .collect();

    suggestions.sort();
    suggestions.truncate(3);
    Some(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtconvert_core::ConverterDecl;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        for (from, to) in [
            ("csv", "json"),
            ("json", "csv"),
            ("csv", "yaml"),
            ("csv", "postgresql"),
            ("docx", "pdf"),
        ] {
            registry.register_decl(ConverterDecl::new(format!("{from}-{to}"), from, to));
        }
        registry
    }

    #[test]
    fn test_find_similar_format() {
        let registry = registry();
        assert_eq!(find_similar_format("yml", &registry).as_deref(), Some("yaml"));
        assert_eq!(find_similar_format("pg", &registry).as_deref(), Some("postgresql"));
        assert_eq!(find_similar_format("jsn", &registry).as_deref(), Some("json"));
        assert_eq!(find_similar_format("cvs", &registry).as_deref(), Some("csv"));
        assert_eq!(find_similar_format("zzzzz", &registry), None);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("csv", "csv"), 0);
        assert_eq!(levenshtein("csv", "csvv"), 1);
        assert_eq!(levenshtein("json", "jsn"), 1);
        assert_eq!(levenshtein("abc", "xyz"), 3);
        assert_eq!(levenshtein("", "sql"), 3);
    }

    #[test]
    fn test_no_path_lists_neighbours() {
        let msg = no_path_error("docx", "yaml", &registry());
        assert!(msg.starts_with("No conversion path found from 'docx' to 'yaml'"));
        assert!(msg.contains("'docx' can convert to: pdf\n"));
        assert!(msg.contains("'yaml' can be created from: csv"));

        let msg = no_path_error("pdf", "csv", &registry());
        assert!(msg.contains("'pdf' has no registered conversions."));
        assert!(msg.contains("'csv' can be created from: json"));
    }

    #[test]
    fn test_unsupported_format() {
        let msg = unsupported_format_error("jsno", &registry());
        assert!(msg.contains("Did you mean 'json'?"));

        let msg = unsupported_format_error("mp4", &registry());
        assert!(msg.contains("Supported formats: csv, docx, json, pdf, postgresql, yaml"));
    }

    #[test]
    fn test_file_not_found_suggests_neighbours() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("people.csv"), "a\n").unwrap();

        let msg = file_not_found_error(&dir.path().join("peple.csv"));
        assert!(msg.contains("does not exist"));
        assert!(msg.contains("Did you mean: people.csv?"));
    }
}
