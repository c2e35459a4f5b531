// Domain rules - Naming, padding and validation policies

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{MplayBatchError, MplayBatchResult};

/// Name used when the host document has no name of its own
pub const UNTITLED_BASE_NAME: &str = "untitled";

fn word_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("static regex"))
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"__(\w+?)__").expect("static regex"))
}

/// Reduce an extension-like value to its first run of word characters.
///
/// `.EXR` becomes `EXR`, `jpg.` becomes `jpg`. Anything after the first
/// non-word character that follows the token is dropped, so `my-ext` becomes
/// `my`. Returns an empty string when the input holds no word characters.
pub fn sanitize_token(value: &str) -> String {
    word_token_regex()
        .find(value)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Validate a zero-padding width
pub fn parse_padding(value: &str, var_name: &str) -> MplayBatchResult<usize> {
    let padding = value
        .trim()
        .parse::<i64>()
        .map_err(|_| MplayBatchError::InvalidVariableType {
            var: var_name.to_string(),
            expected: "int".to_string(),
        })?;

    usize::try_from(padding).map_err(|_| MplayBatchError::VariableOutOfRange {
        var: var_name.to_string(),
    })
}

/// Read a menu toggle value. Integers are on when non-zero, anything else is off.
pub fn parse_toggle(value: Option<&str>) -> bool {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|v| v != 0)
        .unwrap_or(false)
}

/// Zero-pad a number to at least `width` digits; wider numbers are kept whole
pub fn zero_pad(value: u64, width: usize) -> String {
    format!("{:0width$}", value, width = width)
}

/// Derive the sequence base name from a document name.
///
/// Everything from the last `.hip` marker on is dropped, so `shot01.hip`,
/// `shot01.hiplc` and `shot01.hipnc` all give `shot01`.
pub fn document_base_name(document: &str) -> String {
    let name = match document.rfind(".hip") {
        Some(idx) => &document[..idx],
        None => document,
    };

    let name = name.trim();
    if name.is_empty() {
        UNTITLED_BASE_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Rewrite `__NAME__` tokens into `$NAME` host variables
pub fn rewrite_placeholder_tokens(value: &str) -> String {
    placeholder_regex().replace_all(value, "$$$1").into_owned()
}

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(value: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (idx, ch) in value.char_indices() {
        let is_digit = ch.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                out.push(chunk(&value[start..idx], prev));
                start = idx;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(prev) = in_digits {
        out.push(chunk(&value[start..], prev));
    }
    out
}

fn chunk(text: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(text)
    } else {
        Chunk::Text(text)
    }
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Natural ordering: digit runs compare numerically, text runs case-insensitively.
///
/// `a_9.jpg` sorts before `a_10.jpg`. Digit runs of any length are supported.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Chunk::Digits(x), Chunk::Digits(y)) => compare_digit_runs(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

fn is_table_separator(line: &str) -> bool {
    line.len() >= 2 && line.chars().all(|c| c == '-')
}

/// Parse the muxer table printed by `ffmpeg -muxers` (or `-formats`).
///
/// Only rows after the dashed separator (`--` in older releases, `---` once
/// the legend grew a third column) whose flag column carries `E` are kept;
/// comma-separated aliases such as `mov,mp4,m4a` are split.
pub fn parse_muxer_list(output: &str) -> Vec<String> {
    let mut formats = Vec::new();
    let mut in_table = false;

    for line in output.lines() {
        let trimmed = line.trim();
        if !in_table {
            in_table = is_table_separator(trimmed);
            continue;
        }

        let mut columns = trimmed.split_whitespace();
        let (Some(flags), Some(names)) = (columns.next(), columns.next()) else {
            continue;
        };
        if !flags.contains('E') {
            continue;
        }
        for name in names.split(',').filter(|n| !n.is_empty()) {
            if !formats.iter().any(|f| f == name) {
                formats.push(name.to_string());
            }
        }
    }

    formats
}
