//! Getting from the text of a header line to the body a grammar sees.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FOLDING: Regex = Regex::new(r"[\r\n \t]+").unwrap();
    static ref NAME_BODY: Regex = Regex::new(r"(?s)^\s*([^:]+?)\s*:\s*(.*)$").unwrap();
}

/// Collapses every run of CR, LF, space and tab into one space.
pub fn unfold(text: &str) -> String {
    FOLDING.replace_all(text, " ").into_owned()
}

/// The trimmed body of an unfolded `Name: body` line, when the line names
/// `name` (case-insensitively).
pub fn raw_body<'a>(name: &str, unfolded: &'a str) -> Option<&'a str> {
    let captures = NAME_BODY.captures(unfolded)?;
    let found = captures.get(1)?.as_str();
    if !found.eq_ignore_ascii_case(name.trim()) {
        return None;
    }
    Some(captures.get(2)?.as_str().trim())
}
