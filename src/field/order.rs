//! Relative placement of fields when a header block is assembled.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Priority of every field name the table does not list.
pub const UNKNOWN_ORDER: usize = 100;

const FIELD_ORDER: &[&str] = &[
    "return-path",
    "received",
    "resent-date",
    "resent-from",
    "resent-sender",
    "resent-to",
    "resent-cc",
    "resent-bcc",
    "resent-message-id",
    "date",
    "from",
    "sender",
    "reply-to",
    "to",
    "cc",
    "bcc",
    "message-id",
    "in-reply-to",
    "references",
    "subject",
    "comments",
    "keywords",
    "mime-version",
    "content-type",
    "content-transfer-encoding",
    "content-location",
    "content-disposition",
    "content-description",
    "content-id",
];

lazy_static! {
    static ref ORDER: HashMap<&'static str, usize> = FIELD_ORDER
        .iter()
        .enumerate()
        .map(|(priority, &key)| (key, priority))
        .collect();
}

/// Priority of a normalized (lowercased, trimmed) field name. Lower sorts
/// first.
pub fn field_order_id(key: &str) -> usize {
    ORDER.get(key).copied().unwrap_or(UNKNOWN_ORDER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::registry::Registry;

    #[test]
    fn table_is_in_priority_order() {
        assert_eq!(field_order_id("return-path"), 0);
        assert!(field_order_id("date") < field_order_id("from"));
        assert!(field_order_id("subject") < field_order_id("mime-version"));
        assert_eq!(field_order_id("content-id"), FIELD_ORDER.len() - 1);
    }

    #[test]
    fn unknown_names_sort_last() {
        assert_eq!(field_order_id("x-mailer"), UNKNOWN_ORDER);
        assert!(FIELD_ORDER.len() < UNKNOWN_ORDER);
    }

    #[test]
    fn every_entry_is_registered() {
        for key in FIELD_ORDER {
            assert!(Registry::global().kind(key).is_some(), "{}", key);
        }
    }
}
