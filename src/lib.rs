//! Header fields of RFC 5322 messages, parsed lazily by name.

pub mod error;
pub mod field;
pub mod header;
pub mod header_layout;
pub mod headers;
pub mod parse;

pub use error::{FieldError, HeaderError, ParseError, SyntaxError};
pub use field::{Field, DEFAULT_CHARSET};
pub use header::Header;
pub use headers::{Delegate, FieldKind, FieldValue, Structured};
