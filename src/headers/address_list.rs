use nom::branch::alt;
use nom::combinator::map;
use nom::combinator::opt;

use super::address::{AddrSpec, Address};
use super::{FieldBody, StructuredField};
use crate::error::ParseError;
use crate::header_layout::fold_list;
use crate::parse::address::{address_list, path};
use crate::parse::{cfws, complete};

/// From, To, Cc, Bcc, Reply-To, Sender and their Resent- forms.
///
/// A body with no addresses at all (as Bcc often has) is an empty list.
#[derive(Clone, Debug)]
pub struct AddressListField {
    addresses: Vec<Address>,
    charset: String,
    errors: Vec<ParseError>,
}

impl AddressListField {
    pub fn new(addresses: Vec<Address>, charset: &str) -> Self {
        Self {
            addresses,
            charset: charset.to_owned(),
            errors: vec![],
        }
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }
}

impl FieldBody for AddressListField {
    fn encode(&self) -> String {
        fold_list(self.addresses.iter().map(|a| a.encode(&self.charset)))
    }

    field_errors!();
}

impl StructuredField for AddressListField {
    const ELEMENT: &'static str = "address-list";

    fn parse(value: &str, charset: &str) -> Result<Self, ParseError> {
        let addresses = complete(
            Self::ELEMENT,
            value,
            alt((address_list, map(opt(cfws), |_| vec![]))),
        )?;
        Ok(Self::new(addresses, charset))
    }
}

/// Return-Path: an angle-addr, or `<>` for the null path.
#[derive(Clone, Debug)]
pub struct ReturnPathField {
    path: Option<AddrSpec>,
    errors: Vec<ParseError>,
}

impl ReturnPathField {
    pub fn path(&self) -> Option<&AddrSpec> {
        self.path.as_ref()
    }
}

impl FieldBody for ReturnPathField {
    fn encode(&self) -> String {
        match &self.path {
            Some(spec) => format!("<{}>", spec),
            None => "<>".to_owned(),
        }
    }

    field_errors!();
}

impl StructuredField for ReturnPathField {
    const ELEMENT: &'static str = "path";

    fn parse(value: &str, _charset: &str) -> Result<Self, ParseError> {
        Ok(Self {
            path: complete(Self::ELEMENT, value, path)?,
            errors: vec![],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::address::Domain;

    #[test]
    fn list_reencodes() {
        let field = AddressListField::parse(
            "Brennan Vincent <brennan@umanwizard.com>,a@b.com",
            "UTF-8",
        )
        .unwrap();
        assert_eq!(field.addresses().len(), 2);
        assert_eq!(
            field.encode(),
            "Brennan Vincent <brennan@umanwizard.com>, a@b.com"
        );
    }

    #[test]
    fn display_names_follow_the_charset() {
        let field = AddressListField::parse("J\u{f6}rg <j@x.com>, plain@x.com", "UTF-8").unwrap();
        assert_eq!(field.encode(), "=?UTF-8?B?SsO2cmc=?= <j@x.com>, plain@x.com");
    }

    #[test]
    fn empty_list() {
        let field = AddressListField::parse("", "UTF-8").unwrap();
        assert!(field.addresses().is_empty());
        assert_eq!(field.encode(), "");
    }

    #[test]
    fn trailing_garbage_fails() {
        let err = AddressListField::parse("a@b.com garbage", "UTF-8").unwrap_err();
        assert_eq!(err.element, "address-list");
    }

    #[test]
    fn return_path() {
        let field = ReturnPathField::parse("<bounce@lists.example.org>", "UTF-8").unwrap();
        assert_eq!(
            field.path().map(|p| &p.domain),
            Some(&Domain::Name("lists.example.org".to_string()))
        );
        assert_eq!(field.encode(), "<bounce@lists.example.org>");

        let null = ReturnPathField::parse("<>", "UTF-8").unwrap();
        assert!(null.path().is_none());
        assert_eq!(null.encode(), "<>");
    }
}
