use super::{FieldBody, StructuredField};
use crate::error::ParseError;
use crate::header_layout::fold_words;
use crate::parse::complete;
use crate::parse::message_id::{msg_id, msg_id_list};

/// Message-ID, Resent-Message-ID and Content-ID: exactly one msg-id.
#[derive(Clone, Debug)]
pub struct MessageIdField {
    // without the angle brackets
    id: String,
    errors: Vec<ParseError>,
}

impl MessageIdField {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl FieldBody for MessageIdField {
    fn encode(&self) -> String {
        format!("<{}>", self.id)
    }

    field_errors!();
}

impl StructuredField for MessageIdField {
    const ELEMENT: &'static str = "msg-id";

    fn parse(value: &str, _charset: &str) -> Result<Self, ParseError> {
        Ok(Self {
            id: complete(Self::ELEMENT, value, msg_id)?,
            errors: vec![],
        })
    }
}

/// In-Reply-To and References: one or more msg-ids.
#[derive(Clone, Debug)]
pub struct MessageIdListField {
    ids: Vec<String>,
    errors: Vec<ParseError>,
}

impl MessageIdListField {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

impl FieldBody for MessageIdListField {
    fn encode(&self) -> String {
        let bracketed: Vec<String> = self.ids.iter().map(|id| format!("<{}>", id)).collect();
        fold_words(bracketed.iter().map(String::as_str))
    }

    field_errors!();
}

impl StructuredField for MessageIdListField {
    const ELEMENT: &'static str = "msg-id-list";

    fn parse(value: &str, _charset: &str) -> Result<Self, ParseError> {
        Ok(Self {
            ids: complete(Self::ELEMENT, value, msg_id_list)?,
            errors: vec![],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_id() {
        let field = MessageIdField::parse(" <1234@local.machine.example> ", "UTF-8").unwrap();
        assert_eq!(field.id(), "1234@local.machine.example");
        assert_eq!(field.encode(), "<1234@local.machine.example>");
    }

    #[test]
    fn two_ids_is_not_one() {
        assert!(MessageIdField::parse("<a@b> <c@d>", "UTF-8").is_err());
    }

    #[test]
    fn references_fold() {
        let value: Vec<String> = (0..6)
            .map(|n| format!("<message-{}@mail.example.com>", n))
            .collect();
        let field = MessageIdListField::parse(&value.join(" "), "UTF-8").unwrap();
        assert_eq!(field.ids().len(), 6);
        let encoded = field.encode();
        assert!(encoded.contains("\r\n "));
        assert_eq!(encoded.replace("\r\n ", " "), value.join(" "));
    }
}
