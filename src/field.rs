//! One header field: which grammar its body follows, when that body is
//! parsed, and how the field goes back on the wire.

use std::cmp::Ordering;
use std::mem;

use crate::error::{FieldError, ParseError, SyntaxError};
use crate::headers::unstructured::ExtensionField;
use crate::headers::{Delegate, FieldKind, FieldValue, Structured};

pub mod order;
pub mod raw;
pub mod registry;

use order::field_order_id;
use raw::{raw_body, unfold};
use registry::Registry;

/// Charset handed to the collaborators when the caller does not name one.
pub const DEFAULT_CHARSET: &str = "UTF-8";

#[derive(Clone, Debug)]
enum Cache {
    /// No text and no value.
    Empty,
    /// The header line as received; not parsed yet.
    RawOnly(String),
    /// `raw` is the whole line as it will be sent, when it is known.
    Resolved {
        delegate: Delegate,
        raw: Option<String>,
    },
}

#[cfg(test)]
thread_local! {
    static DERIVATIONS: std::cell::Cell<usize> = std::cell::Cell::new(0);
}

#[derive(Clone, Debug)]
pub struct Field {
    name: String,
    charset: String,
    cache: Cache,
    ready_to_send: bool,
}

impl Field {
    fn with_cache(name: &str, charset: &str, cache: Cache) -> Self {
        Self {
            name: Registry::global().canonical_capitalization(name),
            charset: charset.to_owned(),
            cache,
            ready_to_send: false,
        }
    }

    /// A field from one header line, `Name: value`, with folds left in.
    /// The body is not parsed until something asks for it. A line without a
    /// colon is taken as a bare name.
    pub fn parse(line: &str) -> Self {
        Self::parse_with_charset(line, DEFAULT_CHARSET)
    }

    pub fn parse_with_charset(line: &str, charset: &str) -> Self {
        match line.split_once(':') {
            Some((name, _)) => Self::with_cache(name, charset, Cache::RawOnly(line.to_owned())),
            None => Self::with_cache(line, charset, Cache::Empty),
        }
    }

    /// A field with a name and no value yet.
    pub fn named(name: &str) -> Self {
        Self::with_cache(name, DEFAULT_CHARSET, Cache::Empty)
    }

    pub fn new(name: &str, value: &str) -> Self {
        Self::with_charset(name, value, DEFAULT_CHARSET)
    }

    pub fn with_charset(name: &str, value: &str, charset: &str) -> Self {
        let mut field = Self::with_cache(name, charset, Cache::Empty);
        field.set_value(value);
        field
    }

    /// A field holding a pre-built value. Unlike text, an unacceptable value
    /// is an error.
    pub fn structured(name: &str, payload: impl Into<Structured>) -> Result<Self, FieldError> {
        let mut field = Self::named(name);
        field.set_structured(payload)?;
        Ok(field)
    }

    /// Positional construction. When `first` is a whole `Name: value` line,
    /// `second` is its charset; otherwise `second` is the value.
    pub fn build(first: &str, second: Option<&str>) -> Self {
        if first.contains(':') {
            Self::parse_with_charset(first, second.unwrap_or(DEFAULT_CHARSET))
        } else {
            match second {
                Some(value) => Self::new(first, value),
                None => Self::named(first),
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// Replaces the value. Whatever was there before, parsed or not, is
    /// discarded.
    pub fn set_value(&mut self, value: &str) {
        let delegate = create_delegate(&self.name, value, &self.charset);
        self.cache = Cache::Resolved {
            delegate,
            raw: None,
        };
    }

    pub fn set_structured(&mut self, payload: impl Into<Structured>) -> Result<(), SyntaxError> {
        let kind = Registry::global().kind(&self.name);
        let delegate = payload.into().into_delegate(kind, &self.name)?;
        self.cache = Cache::Resolved {
            delegate,
            raw: None,
        };
        Ok(())
    }

    /// Replaces the value with an unparsed header line for this field.
    pub fn set_raw_source(&mut self, line: &str) {
        self.cache = Cache::RawOnly(line.to_owned());
    }

    fn resolve(&mut self) {
        let line = match mem::replace(&mut self.cache, Cache::Empty) {
            Cache::RawOnly(line) => line,
            other => {
                self.cache = other;
                return;
            }
        };
        let unfolded = unfold(&line);
        match raw_body(&self.name, &unfolded) {
            Some(body) => {
                tracing::trace!(name = %self.name, "parsing field body");
                let delegate = create_delegate(&self.name, body, &self.charset);
                self.cache = Cache::Resolved {
                    delegate,
                    raw: Some(line),
                };
            }
            None => {
                tracing::warn!(name = %self.name, line = ?line, "header line has no body for this field");
            }
        }
    }

    fn resolved(&self) -> Option<&Delegate> {
        match &self.cache {
            Cache::Resolved { delegate, .. } => Some(delegate),
            _ => None,
        }
    }

    /// The typed value, parsing the raw line first if needed. `None` when the
    /// field has no value.
    pub fn value(&mut self) -> Option<FieldValue<'_>> {
        self.resolve();
        self.resolved().map(Delegate::value)
    }

    pub fn errors(&mut self) -> &[ParseError] {
        self.resolve();
        self.resolved().map(Delegate::errors).unwrap_or(&[])
    }

    /// The kind that ended up holding the value: the registered one, or
    /// [`FieldKind::Extension`] when the body did not fit it.
    pub fn kind(&mut self) -> Option<FieldKind> {
        self.resolve();
        self.resolved().map(Delegate::kind)
    }

    pub fn delegate(&mut self) -> Option<&Delegate> {
        self.resolve();
        self.resolved()
    }

    /// Mutable access to the value. The cached line is dropped, so the next
    /// encoding reflects whatever is changed through it.
    pub fn delegate_mut(&mut self) -> Option<&mut Delegate> {
        self.resolve();
        match &mut self.cache {
            Cache::Resolved { delegate, raw } => {
                *raw = None;
                Some(delegate)
            }
            _ => None,
        }
    }

    pub fn set_parameter(&mut self, attribute: &str, value: &str) -> Result<(), SyntaxError> {
        let name = self.name.clone();
        match self.delegate_mut() {
            Some(delegate) => delegate.set_parameter(attribute, value),
            None => Err(SyntaxError::new(name, "field has no value")),
        }
    }

    /// The line as it stands: the received text if there is one, otherwise
    /// the value's encoding, computed once.
    pub fn encoded_as_is(&mut self) -> String {
        match &mut self.cache {
            Cache::Empty => terminate(format!("{}: ", self.name)),
            Cache::RawOnly(line) => terminate(line.clone()),
            Cache::Resolved { delegate, raw } => {
                let line = raw.get_or_insert_with(|| encode_line(&self.name, delegate));
                terminate(line.clone())
            }
        }
    }

    /// Fixes the line that will be sent. The first call re-encodes the value
    /// even when a received line is cached; later calls keep the line until
    /// the value changes.
    pub fn ready_to_send(&mut self) {
        let has_raw = matches!(
            self.cache,
            Cache::RawOnly(_) | Cache::Resolved { raw: Some(_), .. }
        );
        if self.ready_to_send && has_raw {
            return;
        }
        self.resolve();
        if let Cache::Resolved { delegate, raw } = &mut self.cache {
            *raw = Some(encode_line(&self.name, delegate));
        }
        self.ready_to_send = true;
    }

    pub fn is_ready_to_send(&self) -> bool {
        self.ready_to_send
    }

    /// The line to send, CRLF-terminated.
    pub fn encoded(&mut self) -> String {
        self.ready_to_send();
        self.encoded_as_is()
    }

    /// Same name, ignoring case. Values are not compared.
    pub fn same(&self, other: &Field) -> bool {
        Registry::normalize(&self.name) == Registry::normalize(&other.name)
    }

    pub fn order_id(&self) -> usize {
        field_order_id(&Registry::normalize(&self.name))
    }

    /// Compares placement in a header block. Fields of equal priority compare
    /// equal, so a stable sort keeps their relative order.
    pub fn cmp_order(&self, other: &Field) -> Ordering {
        self.order_id().cmp(&other.order_id())
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Field {}

/// Builds the collaborator for `name`. A body that does not fit the
/// registered grammar becomes an extension field carrying the failure.
fn create_delegate(name: &str, value: &str, charset: &str) -> Delegate {
    let unfolded = unfold(value);
    let value = unfolded.trim();
    match Registry::global().build(name, value, charset) {
        Ok(delegate) => delegate,
        Err(e) => {
            tracing::debug!(name, err = %e, "field body kept as text");
            let mut fallback = Delegate::from(ExtensionField::new(name, value, charset));
            fallback
                .errors_mut()
                .push(ParseError::new(name, value, e.to_string()));
            fallback
        }
    }
}

fn encode_line(name: &str, delegate: &Delegate) -> String {
    tracing::trace!(name, "encoding field");
    #[cfg(test)]
    DERIVATIONS.with(|count| count.set(count.get() + 1));
    format!("{}: {}", name, delegate.encode())
}

/// Ends `line` with exactly one CRLF. Every trailing CR and LF is dropped
/// first, blank lines included: the line is one field, and an empty line
/// would end the header block.
fn terminate(line: String) -> String {
    let mut line = line
        .trim_end_matches(|c| c == '\r' || c == '\n')
        .to_owned();
    if !line.is_empty() {
        line.push_str("\r\n");
    }
    line
}
