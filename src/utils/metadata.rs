//! Metadata block extraction from decoder diagnostic output
//!
//! Decoders announce in-band stream metadata (icy tags, stream titles) as an
//! indented `Metadata:` section inside their diagnostic text. This module
//! pulls the last such section out of the raw output and normalizes it into
//! a bounded plain-text snippet. Pure text processing, no I/O.

/// Maximum length of the normalized snippet, in characters
const MAX_SNIPPET_CHARS: usize = 4096;

/// Section headers that terminate a metadata block
const SECTION_HEADERS: [&str; 5] = ["Stream", "Input", "Output", "Duration", "At least"];

/// Extract and normalize the last `Metadata:` block from diagnostic text
///
/// The last occurrence wins: later sections reflect deeper decode state.
/// Captured lines are the consecutive indented lines following the marker,
/// up to the first blank line, non-indented line, or new section header.
/// Each captured line is trimmed and `key : value` spacing is normalized to
/// `key: value`. The joined result is stripped of control characters (except
/// `\n` and `\t`) and truncated to 4096 characters.
///
/// Returns `None` when no marker is present or no lines were captured.
pub fn extract_metadata_block(output: &str) -> Option<String> {
    if output.is_empty() {
        return None;
    }

    let norm = output.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = norm.split('\n').collect();

    let marker = lines.iter().rposition(|line| line.trim() == "Metadata:")?;

    let mut captured: Vec<String> = Vec::new();
    for line in &lines[marker + 1..] {
        if line.trim().is_empty() {
            break;
        }
        if is_section_header(line) {
            break;
        }
        if !line.chars().next().is_some_and(char::is_whitespace) {
            break;
        }

        let stripped = line.trim();
        match stripped.split_once(':') {
            Some((key, value)) => captured.push(format!("{}: {}", key.trim(), value.trim())),
            None => captured.push(stripped.to_string()),
        }
    }

    if captured.is_empty() {
        return None;
    }

    let joined = captured.join("\n");
    let cleaned: String = joined
        .chars()
        .filter(|&c| c >= ' ' || c == '\n' || c == '\t')
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.chars().count() > MAX_SNIPPET_CHARS {
        Some(cleaned.chars().take(MAX_SNIPPET_CHARS).collect())
    } else {
        Some(cleaned.to_string())
    }
}

/// True when the line opens a new decoder section, ending the metadata block
fn is_section_header(line: &str) -> bool {
    let trimmed = line.trim_start();
    SECTION_HEADERS.iter().any(|header| {
        trimmed.starts_with(header)
            && !trimmed[header.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
    })
}
