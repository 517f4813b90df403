//! The fixed table of field names with a grammar of their own.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::error::ParseError;
use crate::headers::address_list::{AddressListField, ReturnPathField};
use crate::headers::date::{DateField, ReceivedField};
use crate::headers::message_id::{MessageIdField, MessageIdListField};
use crate::headers::mime::{
    ContentDispositionField, ContentTypeField, MimeVersionField, TransferEncodingField,
};
use crate::headers::unstructured::{ExtensionField, KeywordsField, UnstructuredField};
use crate::headers::{Delegate, FieldKind, StructuredField};

/// Builds a kind's delegate from (unfolded value, charset).
pub type Constructor = fn(&str, &str) -> Result<Delegate, ParseError>;

fn construct<T>(value: &str, charset: &str) -> Result<Delegate, ParseError>
where
    T: StructuredField + Into<Delegate>,
{
    T::parse(value, charset).map(Into::into)
}

// Extension fields are built by name, so that kind has no constructor.
fn constructor(kind: FieldKind) -> Option<Constructor> {
    let construct: Constructor = match kind {
        FieldKind::Unstructured => construct::<UnstructuredField>,
        FieldKind::Keywords => construct::<KeywordsField>,
        FieldKind::Date => construct::<DateField>,
        FieldKind::AddressList => construct::<AddressListField>,
        FieldKind::MessageId => construct::<MessageIdField>,
        FieldKind::MessageIdList => construct::<MessageIdListField>,
        FieldKind::ReturnPath => construct::<ReturnPathField>,
        FieldKind::Received => construct::<ReceivedField>,
        FieldKind::MimeVersion => construct::<MimeVersionField>,
        FieldKind::ContentType => construct::<ContentTypeField>,
        FieldKind::ContentDisposition => construct::<ContentDispositionField>,
        FieldKind::ContentTransferEncoding => construct::<TransferEncodingField>,
        FieldKind::Extension => return None,
    };
    Some(construct)
}

// (canonical capitalization, kind); the key is the lowercased name.
pub(crate) const FIELDS: &[(&str, FieldKind)] = &[
    ("Return-Path", FieldKind::ReturnPath),
    ("Received", FieldKind::Received),
    ("Resent-Date", FieldKind::Date),
    ("Resent-From", FieldKind::AddressList),
    ("Resent-Sender", FieldKind::AddressList),
    ("Resent-To", FieldKind::AddressList),
    ("Resent-Cc", FieldKind::AddressList),
    ("Resent-Bcc", FieldKind::AddressList),
    ("Resent-Message-ID", FieldKind::MessageId),
    ("Date", FieldKind::Date),
    ("From", FieldKind::AddressList),
    ("Sender", FieldKind::AddressList),
    ("Reply-To", FieldKind::AddressList),
    ("To", FieldKind::AddressList),
    ("Cc", FieldKind::AddressList),
    ("Bcc", FieldKind::AddressList),
    ("Message-ID", FieldKind::MessageId),
    ("In-Reply-To", FieldKind::MessageIdList),
    ("References", FieldKind::MessageIdList),
    ("Subject", FieldKind::Unstructured),
    ("Comments", FieldKind::Unstructured),
    ("Keywords", FieldKind::Keywords),
    ("MIME-Version", FieldKind::MimeVersion),
    ("Content-Type", FieldKind::ContentType),
    ("Content-Transfer-Encoding", FieldKind::ContentTransferEncoding),
    ("Content-Location", FieldKind::Unstructured),
    ("Content-Disposition", FieldKind::ContentDisposition),
    ("Content-Description", FieldKind::Unstructured),
    ("Content-ID", FieldKind::MessageId),
];

#[derive(Clone, Copy)]
pub struct Entry {
    pub kind: FieldKind,
    pub canonical: &'static str,
    pub construct: Constructor,
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("kind", &self.kind)
            .field("canonical", &self.canonical)
            .finish()
    }
}

pub struct Registry {
    entries: HashMap<String, Entry>,
}

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
}

impl Registry {
    fn new() -> Self {
        let entries = FIELDS
            .iter()
            .filter_map(|&(canonical, kind)| {
                let entry = Entry {
                    kind,
                    canonical,
                    construct: constructor(kind)?,
                };
                Some((canonical.to_ascii_lowercase(), entry))
            })
            .collect();
        Self { entries }
    }

    /// The table, built on first use and read-only afterwards.
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    pub fn normalize(name: &str) -> String {
        name.trim().to_ascii_lowercase()
    }

    pub fn lookup(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn kind(&self, name: &str) -> Option<FieldKind> {
        self.lookup(&Self::normalize(name)).map(|entry| entry.kind)
    }

    /// The registered spelling of `name`, or `name` itself (trimmed) when
    /// it is not registered.
    pub fn canonical_capitalization(&self, name: &str) -> String {
        match self.lookup(&Self::normalize(name)) {
            Some(entry) => entry.canonical.to_owned(),
            None => name.trim().to_owned(),
        }
    }

    /// Picks the collaborator for `name`: the registered kind, or an
    /// extension field for names the registry does not know.
    pub fn build(&self, name: &str, value: &str, charset: &str) -> Result<Delegate, ParseError> {
        match self.lookup(&Self::normalize(name)) {
            Some(entry) => (entry.construct)(value, charset),
            None => Ok(ExtensionField::new(name, value, charset).into()),
        }
    }
}
