use std::fmt::{self, Display};

use itertools::Itertools;

use super::{FieldBody, StructuredField};
use crate::error::{ParseError, SyntaxError};
use crate::parse::mime::{disposition, mechanism, media_type, mime_version};
use crate::parse::{complete, is_token_char};

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_char)
}

fn check_token(element: &str, what: &str, s: &str) -> Result<(), SyntaxError> {
    if is_token(s) {
        Ok(())
    } else {
        Err(SyntaxError::new(
            element,
            format!("{} {:?} is not a token", what, s),
        ))
    }
}

fn quote_value(value: &str) -> String {
    if is_token(value) {
        value.to_owned()
    } else {
        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push('"');
        for ch in value.chars() {
            if ch == '"' || ch == '\\' {
                quoted.push('\\');
            }
            quoted.push(ch);
        }
        quoted.push('"');
        quoted
    }
}

fn write_parameters(f: &mut fmt::Formatter<'_>, parameters: &[(String, String)]) -> fmt::Result {
    if !parameters.is_empty() {
        let joined = parameters
            .iter()
            .map(|(attribute, value)| format!("{}={}", attribute, quote_value(value)))
            .join("; ");
        write!(f, "; {}", joined)?;
    }
    Ok(())
}

// Attribute names compare case-insensitively; a repeated name replaces the
// earlier value in place.
fn set_parameter(
    element: &str,
    parameters: &mut Vec<(String, String)>,
    attribute: &str,
    value: &str,
) -> Result<(), SyntaxError> {
    check_token(element, "parameter name", attribute)?;
    let attribute = attribute.to_ascii_lowercase();
    match parameters.iter_mut().find(|(name, _)| *name == attribute) {
        Some((_, existing)) => *existing = value.to_owned(),
        None => parameters.push((attribute, value.to_owned())),
    }
    Ok(())
}

fn get_parameter<'a>(parameters: &'a [(String, String)], attribute: &str) -> Option<&'a str> {
    parameters
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
        .map(|(_, value)| value.as_str())
}

/// A media type with its parameters, in the order they were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub main_type: String,
    pub sub_type: String,
    pub parameters: Vec<(String, String)>,
}

impl ContentType {
    pub fn new(main_type: &str, sub_type: &str) -> Self {
        Self {
            main_type: main_type.to_ascii_lowercase(),
            sub_type: sub_type.to_ascii_lowercase(),
            parameters: vec![],
        }
    }

    pub fn with_parameter(mut self, attribute: &str, value: &str) -> Self {
        self.parameters
            .push((attribute.to_ascii_lowercase(), value.to_owned()));
        self
    }

    /// `type/subtype`
    pub fn mime_type(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    pub fn parameter(&self, attribute: &str) -> Option<&str> {
        get_parameter(&self.parameters, attribute)
    }

    pub fn set_parameter(&mut self, attribute: &str, value: &str) -> Result<(), SyntaxError> {
        set_parameter(
            ContentTypeField::ELEMENT,
            &mut self.parameters,
            attribute,
            value,
        )
    }

    fn validate(&self) -> Result<(), SyntaxError> {
        let element = ContentTypeField::ELEMENT;
        check_token(element, "media type", &self.main_type)?;
        check_token(element, "subtype", &self.sub_type)?;
        for (attribute, _) in &self.parameters {
            check_token(element, "parameter name", attribute)?;
        }
        Ok(())
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)?;
        write_parameters(f, &self.parameters)
    }
}

#[derive(Clone, Debug)]
pub struct ContentTypeField {
    content_type: ContentType,
    errors: Vec<ParseError>,
}

impl ContentTypeField {
    /// Takes a pre-built value, which bypasses the text grammar and so is
    /// checked here instead.
    pub fn from_payload(content_type: ContentType) -> Result<Self, SyntaxError> {
        content_type.validate()?;
        Ok(Self {
            content_type,
            errors: vec![],
        })
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    pub fn set_parameter(&mut self, attribute: &str, value: &str) -> Result<(), SyntaxError> {
        self.content_type.set_parameter(attribute, value)
    }
}

impl FieldBody for ContentTypeField {
    fn encode(&self) -> String {
        self.content_type.to_string()
    }

    field_errors!();
}

impl StructuredField for ContentTypeField {
    const ELEMENT: &'static str = "content-type";

    fn parse(value: &str, _charset: &str) -> Result<Self, ParseError> {
        let (main_type, sub_type, parameters) = complete(Self::ELEMENT, value, media_type)?;
        Ok(Self {
            content_type: ContentType {
                main_type,
                sub_type,
                parameters,
            },
            errors: vec![],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    pub disposition_type: String,
    pub parameters: Vec<(String, String)>,
}

impl ContentDisposition {
    pub fn new(disposition_type: &str) -> Self {
        Self {
            disposition_type: disposition_type.to_ascii_lowercase(),
            parameters: vec![],
        }
    }

    pub fn with_parameter(mut self, attribute: &str, value: &str) -> Self {
        self.parameters
            .push((attribute.to_ascii_lowercase(), value.to_owned()));
        self
    }

    pub fn parameter(&self, attribute: &str) -> Option<&str> {
        get_parameter(&self.parameters, attribute)
    }

    pub fn set_parameter(&mut self, attribute: &str, value: &str) -> Result<(), SyntaxError> {
        set_parameter(
            ContentDispositionField::ELEMENT,
            &mut self.parameters,
            attribute,
            value,
        )
    }

    fn validate(&self) -> Result<(), SyntaxError> {
        let element = ContentDispositionField::ELEMENT;
        check_token(element, "disposition type", &self.disposition_type)?;
        for (attribute, _) in &self.parameters {
            check_token(element, "parameter name", attribute)?;
        }
        Ok(())
    }
}

impl Display for ContentDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.disposition_type)?;
        write_parameters(f, &self.parameters)
    }
}

#[derive(Clone, Debug)]
pub struct ContentDispositionField {
    disposition: ContentDisposition,
    errors: Vec<ParseError>,
}

impl ContentDispositionField {
    pub fn from_payload(disposition: ContentDisposition) -> Result<Self, SyntaxError> {
        disposition.validate()?;
        Ok(Self {
            disposition,
            errors: vec![],
        })
    }

    pub fn disposition(&self) -> &ContentDisposition {
        &self.disposition
    }

    pub fn set_parameter(&mut self, attribute: &str, value: &str) -> Result<(), SyntaxError> {
        self.disposition.set_parameter(attribute, value)
    }
}

impl FieldBody for ContentDispositionField {
    fn encode(&self) -> String {
        self.disposition.to_string()
    }

    field_errors!();
}

impl StructuredField for ContentDispositionField {
    const ELEMENT: &'static str = "content-disposition";

    fn parse(value: &str, _charset: &str) -> Result<Self, ParseError> {
        let (disposition_type, parameters) = complete(Self::ELEMENT, value, disposition)?;
        Ok(Self {
            disposition: ContentDisposition {
                disposition_type,
                parameters,
            },
            errors: vec![],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MimeVersion {
    pub major: u32,
    pub minor: u32,
}

#[derive(Clone, Debug)]
pub struct MimeVersionField {
    version: MimeVersion,
    errors: Vec<ParseError>,
}

impl MimeVersionField {
    pub fn version(&self) -> MimeVersion {
        self.version
    }
}

impl FieldBody for MimeVersionField {
    fn encode(&self) -> String {
        format!("{}.{}", self.version.major, self.version.minor)
    }

    field_errors!();
}

impl StructuredField for MimeVersionField {
    const ELEMENT: &'static str = "version";

    fn parse(value: &str, _charset: &str) -> Result<Self, ParseError> {
        let (major, minor) = complete(Self::ELEMENT, value, mime_version)?;
        Ok(Self {
            version: MimeVersion { major, minor },
            errors: vec![],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEncoding {
    SevenBit,
    EightBit,
    Binary,
    QuotedPrintable,
    Base64,
    /// An `x-token` or IANA-registered mechanism we have no name for.
    Other(String),
}

impl TransferEncoding {
    /// Expects a lowercased mechanism.
    fn from_mechanism(mechanism: String) -> Self {
        match mechanism.as_str() {
            "7bit" => TransferEncoding::SevenBit,
            "8bit" => TransferEncoding::EightBit,
            "binary" => TransferEncoding::Binary,
            "quoted-printable" => TransferEncoding::QuotedPrintable,
            "base64" => TransferEncoding::Base64,
            _ => TransferEncoding::Other(mechanism),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransferEncoding::SevenBit => "7bit",
            TransferEncoding::EightBit => "8bit",
            TransferEncoding::Binary => "binary",
            TransferEncoding::QuotedPrintable => "quoted-printable",
            TransferEncoding::Base64 => "base64",
            TransferEncoding::Other(mechanism) => mechanism,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TransferEncodingField {
    encoding: TransferEncoding,
    errors: Vec<ParseError>,
}

impl TransferEncodingField {
    pub fn encoding(&self) -> &TransferEncoding {
        &self.encoding
    }
}

impl FieldBody for TransferEncodingField {
    fn encode(&self) -> String {
        self.encoding.as_str().to_owned()
    }

    field_errors!();
}

impl StructuredField for TransferEncodingField {
    const ELEMENT: &'static str = "mechanism";

    fn parse(value: &str, _charset: &str) -> Result<Self, ParseError> {
        let mechanism = complete(Self::ELEMENT, value, mechanism)?;
        Ok(Self {
            encoding: TransferEncoding::from_mechanism(mechanism),
            errors: vec![],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parse_and_encode() {
        let field =
            ContentTypeField::parse("Text/Plain; Charset=utf-8; format=flowed", "UTF-8").unwrap();
        let ct = field.content_type();
        assert_eq!(ct.mime_type(), "text/plain");
        assert_eq!(ct.parameter("CHARSET"), Some("utf-8"));
        assert_eq!(field.encode(), "text/plain; charset=utf-8; format=flowed");
    }

    #[test]
    fn parameter_values_are_quoted_when_needed() {
        let ct = ContentType::new("multipart", "mixed").with_parameter("boundary", "a b=c");
        assert_eq!(ct.to_string(), r#"multipart/mixed; boundary="a b=c""#);
    }

    #[test]
    fn set_parameter_replaces_in_place() {
        let mut ct = ContentType::new("text", "plain")
            .with_parameter("charset", "us-ascii")
            .with_parameter("format", "flowed");
        ct.set_parameter("Charset", "utf-8").unwrap();
        assert_eq!(ct.to_string(), "text/plain; charset=utf-8; format=flowed");
        assert!(ct.set_parameter("bad name", "x").is_err());
    }

    #[test]
    fn invalid_payload_is_a_syntax_error() {
        let err = ContentTypeField::from_payload(ContentType::new("text", "")).unwrap_err();
        assert_eq!(err.element, "content-type");
        let err = ContentDispositionField::from_payload(
            ContentDisposition::new("attachment").with_parameter("file name", "x"),
        )
        .unwrap_err();
        assert_eq!(err.element, "content-disposition");
    }

    #[test]
    fn disposition() {
        let field =
            ContentDispositionField::parse("attachment; filename=\"my file.txt\"", "UTF-8")
                .unwrap();
        assert_eq!(field.disposition().parameter("filename"), Some("my file.txt"));
        assert_eq!(field.encode(), "attachment; filename=\"my file.txt\"");
    }

    #[test]
    fn mime_version() {
        let field = MimeVersionField::parse("1.0", "UTF-8").unwrap();
        assert_eq!(field.version(), MimeVersion { major: 1, minor: 0 });
        assert_eq!(field.encode(), "1.0");
        assert!(MimeVersionField::parse("one", "UTF-8").is_err());
    }

    #[test]
    fn transfer_encoding() {
        let field = TransferEncodingField::parse(" Quoted-Printable ", "UTF-8").unwrap();
        assert_eq!(field.encoding(), &TransferEncoding::QuotedPrintable);
        assert_eq!(field.encode(), "quoted-printable");
        let field = TransferEncodingField::parse("x-uuencode", "UTF-8").unwrap();
        assert_eq!(field.encoding(), &TransferEncoding::Other("x-uuencode".to_string()));
    }
}
