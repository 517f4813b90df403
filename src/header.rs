//! A header block: the fields of a message up to the empty line.

use crate::error::{HeaderError, ParseError};
use crate::field::{Field, DEFAULT_CHARSET};

#[derive(Clone, Copy)]
struct Lines<'a> {
    remaining: &'a str,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    // CRLF or a bare LF ends a line
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let (line, rest) = match self.remaining.find('\n') {
            Some(pos) => (&self.remaining[..pos], &self.remaining[pos + 1..]),
            None => (self.remaining, ""),
        };
        self.remaining = rest;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Header {
    fields: Vec<Field>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `text` into fields, keeping each field's lines as received.
    /// Parsing stops at the first empty line; anything after it is ignored.
    pub fn parse(text: &str) -> Result<Self, HeaderError> {
        Self::parse_with_charset(text, DEFAULT_CHARSET)
    }

    /// As [`Header::parse`], with `charset` for every field.
    pub fn parse_with_charset(text: &str, charset: &str) -> Result<Self, HeaderError> {
        let mut fields = vec![];
        let mut last: Option<String> = None;
        for l in (Lines { remaining: text }) {
            let is_continuation = l.starts_with(|ch: char| ch == ' ' || ch == '\t');
            if is_continuation {
                let line = last.as_mut().ok_or(HeaderError::ContinuationAtBeginning)?;
                line.push_str("\r\n");
                line.push_str(l);
                continue;
            }
            if let Some(line) = last.take() {
                fields.push(Field::parse_with_charset(&line, charset));
            }
            if l.is_empty() {
                break;
            }
            if !l.contains(':') {
                return Err(HeaderError::MalformedHeader(l.to_owned()));
            }
            last = Some(l.to_owned());
        }
        if let Some(line) = last {
            fields.push(Field::parse_with_charset(&line, charset));
        }
        Ok(Self { fields })
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// The first field called `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields
            .iter_mut()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Puts the fields in their canonical order. Fields of equal priority
    /// keep their relative order.
    pub fn sort(&mut self) {
        self.fields.sort_by(Field::cmp_order);
    }

    /// The sorted block, one CRLF-terminated line per field.
    pub fn encoded(&mut self) -> String {
        self.sort();
        self.fields.iter_mut().map(Field::encoded).collect()
    }

    /// Every grammar failure recorded on any field.
    pub fn errors(&mut self) -> Vec<ParseError> {
        self.fields
            .iter_mut()
            .flat_map(|f| f.errors().to_vec())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::{FieldKind, FieldValue};

    const MESSAGE: &str = r#"To: brennan.vincent@gmail.com
From: Brennan Vincent <brennan@umanwizard.com>
Subject: this is a test
Message-ID: <422f4e65-56da-24e2-3467-f60f2cc4d943@umanwizard.com>
Date: Fri, 18 Sep 2020 23:35:23 -0400
User-Agent: Mozilla/5.0 (X11; Linux x86_64; rv:68.0) Gecko/20100101
 Thunderbird/68.10.0
MIME-Version: 1.0
Content-Type: text/plain; charset=utf-8; format=flowed
Content-Transfer-Encoding: 7bit
Content-Language: en-US
Bonjour:Tout
  Le
 monde!

testing! 3
"#;

    #[test]
    fn test_parse() {
        let text = MESSAGE.replace('\n', "\r\n");
        let mut header = Header::parse(&text).unwrap();
        assert_eq!(header.len(), 11);

        let bonjour = header.get_mut("bonjour").unwrap();
        assert_eq!(bonjour.encoded_as_is(), "Bonjour:Tout\r\n  Le\r\n monde!\r\n");
        assert_eq!(bonjour.value(), Some(FieldValue::Text("Tout Le monde!")));

        let agent = header.get_mut("User-Agent").unwrap();
        assert_eq!(
            agent.value(),
            Some(FieldValue::Text(
                "Mozilla/5.0 (X11; Linux x86_64; rv:68.0) Gecko/20100101 Thunderbird/68.10.0"
            ))
        );

        let content_type = header.get_mut("content-type").unwrap();
        assert_eq!(content_type.kind(), Some(FieldKind::ContentType));
        assert!(header.errors().is_empty());
    }

    #[test]
    fn bare_newlines_are_accepted() {
        let header = Header::parse(MESSAGE).unwrap();
        assert_eq!(header.len(), 11);
        assert_eq!(header.fields()[0].name(), "To");
    }

    #[test]
    fn encoded_block_is_sorted() {
        let mut header = Header::parse(
            "X-Mailer: test\r\nSubject: hi\r\nTo: a@b.com\r\nFrom: c@d.com\r\nX-Tag: 1\r\n",
        )
        .unwrap();
        assert_eq!(
            header.encoded(),
            "From: c@d.com\r\nTo: a@b.com\r\nSubject: hi\r\nX-Mailer: test\r\nX-Tag: 1\r\n"
        );
    }

    #[test]
    fn continuation_first_is_an_error() {
        assert_eq!(
            Header::parse(" folded\r\nSubject: hi\r\n").unwrap_err(),
            HeaderError::ContinuationAtBeginning
        );
    }

    #[test]
    fn line_without_colon_is_an_error() {
        assert_eq!(
            Header::parse("Subject: hi\r\nnonsense\r\n").unwrap_err(),
            HeaderError::MalformedHeader("nonsense".to_owned())
        );
    }

    #[test]
    fn grammar_failures_are_collected() {
        let mut header = Header::parse("Date: someday\r\nTo: a@b.com\r\n").unwrap();
        let errors = header.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].element, "Date");
    }

    #[test]
    fn charset_reaches_every_field() {
        let header = Header::parse_with_charset("Subject: hi\nX-A: b\n", "utf8").unwrap();
        assert!(header.fields().iter().all(|f| f.charset() == "utf8"));
    }

    #[test]
    fn lookups_ignore_case() {
        let mut header = Header::new();
        header.push(Field::new("x-custom", "1"));
        assert!(header.get("X-CUSTOM").is_some());
        assert!(header.get("X-Other").is_none());
        assert!(!header.is_empty());
    }
}
