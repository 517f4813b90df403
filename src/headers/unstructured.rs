use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use nom::bytes::complete::tag;
use nom::multi::separated_list1;

use super::{FieldBody, StructuredField};
use crate::error::ParseError;
use crate::header_layout::{fold_list, fold_words};
use crate::parse::{complete, phrase};

// Longest slice of text per encoded-word: 45 octets are 60 base64
// characters, which keeps each word under the 75 allowed.
const ENCODED_WORD_OCTETS: usize = 45;

fn word_label(charset: &str) -> &str {
    if charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("utf8") {
        charset
    } else {
        tracing::debug!(charset, "non-UTF-8 charset, labelling encoded-words as UTF-8");
        "UTF-8"
    }
}

fn encoded_words(run: &str, label: &str, out: &mut Vec<String>) {
    let mut start = 0;
    while start < run.len() {
        let mut end = (start + ENCODED_WORD_OCTETS).min(run.len());
        while !run.is_char_boundary(end) {
            end -= 1;
        }
        out.push(format!(
            "=?{}?B?{}?=",
            label,
            STANDARD.encode(&run.as_bytes()[start..end])
        ));
        start = end;
    }
}

/// Splits unfolded text into wire tokens, turning each run of non-ASCII
/// words into RFC 2047 encoded-words.
pub(crate) fn encode_text(text: &str, charset: &str) -> Vec<String> {
    if text.is_ascii() {
        return text.split(' ').map(str::to_owned).collect();
    }
    let label = word_label(charset);
    let mut tokens = vec![];
    let mut run: Vec<&str> = vec![];
    for word in text.split(' ') {
        if word.is_ascii() {
            if !run.is_empty() {
                encoded_words(&run.join(" "), label, &mut tokens);
                run.clear();
            }
            tokens.push(word.to_owned());
        } else {
            run.push(word);
        }
    }
    if !run.is_empty() {
        encoded_words(&run.join(" "), label, &mut tokens);
    }
    tokens
}

/// Free text, as in Subject or Comments. Never fails to parse.
#[derive(Clone, Debug)]
pub struct UnstructuredField {
    text: String,
    charset: String,
    errors: Vec<ParseError>,
}

impl UnstructuredField {
    pub fn new(text: &str, charset: &str) -> Self {
        Self {
            text: text.to_owned(),
            charset: charset.to_owned(),
            errors: vec![],
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl FieldBody for UnstructuredField {
    fn encode(&self) -> String {
        let tokens = encode_text(&self.text, &self.charset);
        fold_words(tokens.iter().map(String::as_str))
    }

    field_errors!();
}

impl StructuredField for UnstructuredField {
    const ELEMENT: &'static str = "unstructured";

    fn parse(value: &str, charset: &str) -> Result<Self, ParseError> {
        Ok(Self::new(value, charset))
    }
}

/// Any field name the registry does not know, and the fallback for bodies
/// that failed their own grammar.
#[derive(Clone, Debug)]
pub struct ExtensionField {
    name: String,
    body: UnstructuredField,
    errors: Vec<ParseError>,
}

impl ExtensionField {
    pub fn new(name: &str, value: &str, charset: &str) -> Self {
        Self {
            name: name.to_owned(),
            body: UnstructuredField::new(value, charset),
            errors: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        self.body.text()
    }
}

impl FieldBody for ExtensionField {
    fn encode(&self) -> String {
        self.body.encode()
    }

    field_errors!();
}

/// `phrase *("," phrase)`
#[derive(Clone, Debug)]
pub struct KeywordsField {
    keywords: Vec<String>,
    errors: Vec<ParseError>,
}

impl KeywordsField {
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl FieldBody for KeywordsField {
    fn encode(&self) -> String {
        fold_list(self.keywords.iter().cloned())
    }

    field_errors!();
}

impl StructuredField for KeywordsField {
    const ELEMENT: &'static str = "keywords";

    fn parse(value: &str, _charset: &str) -> Result<Self, ParseError> {
        let phrases = complete(Self::ELEMENT, value, separated_list1(tag(b","), phrase))?;
        Ok(Self {
            keywords: phrases.into_iter().map(|words| words.join(" ")).collect(),
            errors: vec![],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_text_round_trips() {
        let field = UnstructuredField::parse("Hello World", "UTF-8").unwrap();
        assert_eq!(field.text(), "Hello World");
        assert_eq!(field.encode(), "Hello World");
    }

    #[test]
    fn non_ascii_runs_become_encoded_words() {
        let field = UnstructuredField::new("Caf\u{e9} cr\u{e8}me brûlée time", "UTF-8");
        let encoded = field.encode();
        assert_eq!(
            encoded,
            format!(
                "=?UTF-8?B?{}?= time",
                STANDARD.encode("Caf\u{e9} cr\u{e8}me brûlée")
            )
        );
    }

    #[test]
    fn long_runs_split_on_char_boundaries() {
        let text = "\u{e9}".repeat(40);
        let tokens = encode_text(&text, "utf-8");
        assert_eq!(tokens.len(), 2);
        for token in &tokens {
            assert!(token.starts_with("=?utf-8?B?"));
            assert!(token.len() <= 75);
        }
    }

    #[test]
    fn foreign_charset_labels_utf8() {
        let tokens = encode_text("\u{e9}t\u{e9}", "ISO-8859-1");
        assert!(tokens[0].starts_with("=?UTF-8?B?"));
    }

    #[test]
    fn extension_keeps_name_and_text() {
        let field = ExtensionField::new("X-Mailer", "mailfield 0.1", "UTF-8");
        assert_eq!(field.name(), "X-Mailer");
        assert_eq!(field.text(), "mailfield 0.1");
        assert_eq!(field.encode(), "mailfield 0.1");
        assert!(field.errors().is_empty());
    }

    #[test]
    fn keywords_list() {
        let field = KeywordsField::parse("rust, \"email headers\",nom", "UTF-8").unwrap();
        assert_eq!(field.keywords(), ["rust", "email headers", "nom"]);
        assert_eq!(field.encode(), "rust, email headers, nom");
    }

    #[test]
    fn keywords_reject_empty_entry() {
        let err = KeywordsField::parse("a,,b", "UTF-8").unwrap_err();
        assert_eq!(err.element, "keywords");
    }
}
