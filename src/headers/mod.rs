//! The per-kind field collaborators and the [`Delegate`] that wraps them.

use chrono::{DateTime, FixedOffset};
use enum_kinds::EnumKind;

use crate::error::{ParseError, SyntaxError};

macro_rules! field_errors {
    () => {
        fn errors(&self) -> &[crate::error::ParseError] {
            &self.errors
        }
        fn errors_mut(&mut self) -> &mut Vec<crate::error::ParseError> {
            &mut self.errors
        }
    };
}

pub mod address;
pub mod address_list;
pub mod date;
pub mod message_id;
pub mod mime;
pub mod unstructured;

use address::{AddrSpec, Address};
use address_list::{AddressListField, ReturnPathField};
use date::{DateField, Received, ReceivedField};
use message_id::{MessageIdField, MessageIdListField};
use mime::{
    ContentDisposition, ContentDispositionField, ContentType, ContentTypeField, MimeVersion,
    MimeVersionField, TransferEncoding, TransferEncodingField,
};
use unstructured::{ExtensionField, KeywordsField, UnstructuredField};

/// What every field body offers once it has been built.
pub trait FieldBody {
    /// The body as it goes on the wire: no `Name: ` prefix and no trailing
    /// line terminator.
    fn encode(&self) -> String;
    fn errors(&self) -> &[ParseError];
    fn errors_mut(&mut self) -> &mut Vec<ParseError>;
}

/// A field body with its own grammar, built from unfolded text.
pub trait StructuredField: FieldBody + Sized {
    /// Grammar element named in the errors this kind reports.
    const ELEMENT: &'static str;

    fn parse(value: &str, charset: &str) -> Result<Self, ParseError>;
}

macro_rules! delegates {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        /// The active body of a [`Field`](crate::Field): one variant per
        /// registered kind, plus the opaque extension fallback.
        #[derive(Clone, Debug, EnumKind)]
        #[enum_kind(FieldKind, derive(Hash))]
        pub enum Delegate {
            $($variant($ty),)+
        }

        $(
            impl From<$ty> for Delegate {
                fn from(field: $ty) -> Self {
                    Delegate::$variant(field)
                }
            }
        )+

        impl Delegate {
            fn body(&self) -> &dyn FieldBody {
                match self {
                    $(Delegate::$variant(field) => field,)+
                }
            }

            fn body_mut(&mut self) -> &mut dyn FieldBody {
                match self {
                    $(Delegate::$variant(field) => field,)+
                }
            }
        }
    };
}

delegates! {
    Unstructured(UnstructuredField),
    Keywords(KeywordsField),
    Date(DateField),
    AddressList(AddressListField),
    MessageId(MessageIdField),
    MessageIdList(MessageIdListField),
    ReturnPath(ReturnPathField),
    Received(ReceivedField),
    MimeVersion(MimeVersionField),
    ContentType(ContentTypeField),
    ContentDisposition(ContentDispositionField),
    ContentTransferEncoding(TransferEncodingField),
    Extension(ExtensionField),
}

/// A borrowed view of a delegate's typed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Keywords(&'a [String]),
    Date(&'a DateTime<FixedOffset>),
    Addresses(&'a [Address]),
    MessageId(&'a str),
    MessageIds(&'a [String]),
    ReturnPath(Option<&'a AddrSpec>),
    Received(&'a Received),
    MimeVersion(MimeVersion),
    ContentType(&'a ContentType),
    ContentDisposition(&'a ContentDisposition),
    TransferEncoding(&'a TransferEncoding),
}

impl<'a> FieldValue<'a> {
    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A pre-built value handed to a field instead of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Structured {
    ContentType(ContentType),
    ContentDisposition(ContentDisposition),
}

impl From<ContentType> for Structured {
    fn from(content_type: ContentType) -> Self {
        Structured::ContentType(content_type)
    }
}

impl From<ContentDisposition> for Structured {
    fn from(disposition: ContentDisposition) -> Self {
        Structured::ContentDisposition(disposition)
    }
}

impl Structured {
    /// Builds the delegate for a field of `kind`, which must be the kind that
    /// carries this payload.
    pub fn into_delegate(self, kind: Option<FieldKind>, name: &str) -> Result<Delegate, SyntaxError> {
        match (kind, self) {
            (Some(FieldKind::ContentType), Structured::ContentType(content_type)) => {
                ContentTypeField::from_payload(content_type).map(Delegate::from)
            }
            (Some(FieldKind::ContentDisposition), Structured::ContentDisposition(disposition)) => {
                ContentDispositionField::from_payload(disposition).map(Delegate::from)
            }
            (_, payload) => Err(SyntaxError::new(
                name,
                format!("a {} value does not belong in this field", payload.element()),
            )),
        }
    }

    fn element(&self) -> &'static str {
        match self {
            Structured::ContentType(_) => ContentTypeField::ELEMENT,
            Structured::ContentDisposition(_) => ContentDispositionField::ELEMENT,
        }
    }
}

impl Delegate {
    pub fn kind(&self) -> FieldKind {
        FieldKind::from(self)
    }

    pub fn value(&self) -> FieldValue<'_> {
        match self {
            Delegate::Unstructured(field) => FieldValue::Text(field.text()),
            Delegate::Keywords(field) => FieldValue::Keywords(field.keywords()),
            Delegate::Date(field) => FieldValue::Date(field.date_time()),
            Delegate::AddressList(field) => FieldValue::Addresses(field.addresses()),
            Delegate::MessageId(field) => FieldValue::MessageId(field.id()),
            Delegate::MessageIdList(field) => FieldValue::MessageIds(field.ids()),
            Delegate::ReturnPath(field) => FieldValue::ReturnPath(field.path()),
            Delegate::Received(field) => FieldValue::Received(field.received()),
            Delegate::MimeVersion(field) => FieldValue::MimeVersion(field.version()),
            Delegate::ContentType(field) => FieldValue::ContentType(field.content_type()),
            Delegate::ContentDisposition(field) => {
                FieldValue::ContentDisposition(field.disposition())
            }
            Delegate::ContentTransferEncoding(field) => {
                FieldValue::TransferEncoding(field.encoding())
            }
            Delegate::Extension(field) => FieldValue::Text(field.text()),
        }
    }

    pub fn encode(&self) -> String {
        self.body().encode()
    }

    pub fn errors(&self) -> &[ParseError] {
        self.body().errors()
    }

    pub fn errors_mut(&mut self) -> &mut Vec<ParseError> {
        self.body_mut().errors_mut()
    }

    /// Sets a named parameter on kinds that carry parameters.
    pub fn set_parameter(&mut self, attribute: &str, value: &str) -> Result<(), SyntaxError> {
        match self {
            Delegate::ContentType(field) => field.set_parameter(attribute, value),
            Delegate::ContentDisposition(field) => field.set_parameter(attribute, value),
            other => Err(SyntaxError::new(
                format!("{:?}", other.kind()),
                "field kind takes no parameters",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        let delegate = Delegate::from(UnstructuredField::new("hi", "UTF-8"));
        assert_eq!(delegate.kind(), FieldKind::Unstructured);
        assert_eq!(delegate.value().as_text(), Some("hi"));
    }

    #[test]
    fn parameters_only_on_mime_kinds() {
        let mut subject = Delegate::from(UnstructuredField::new("hi", "UTF-8"));
        assert!(subject.set_parameter("charset", "utf-8").is_err());

        let mut content_type =
            Delegate::from(ContentTypeField::parse("text/plain", "UTF-8").unwrap());
        content_type.set_parameter("charset", "utf-8").unwrap();
        assert_eq!(content_type.encode(), "text/plain; charset=utf-8");
    }

    #[test]
    fn payload_must_match_kind() {
        let payload = Structured::from(ContentType::new("text", "plain"));
        let err = payload
            .clone()
            .into_delegate(Some(FieldKind::Date), "Date")
            .unwrap_err();
        assert_eq!(err.element, "Date");
        assert!(payload
            .into_delegate(Some(FieldKind::ContentType), "Content-Type")
            .is_ok());
    }

    #[test]
    fn fallback_errors_are_appendable() {
        let mut delegate = Delegate::from(ExtensionField::new("X-Foo", "bar", "UTF-8"));
        delegate
            .errors_mut()
            .push(ParseError::new("X-Foo", "bar", "testing"));
        assert_eq!(delegate.errors().len(), 1);
    }
}
