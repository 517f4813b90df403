use std::fmt::{self, Display};

use itertools::Itertools;

use super::unstructured::encode_text;
use crate::parse::{dot_atom_text, is_atext, is_special};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    Name(String),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddrSpec {
    pub local_part: String,
    pub domain: Domain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub display_name: Vec<String>,
    pub addr_spec: AddrSpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub display_name: Vec<String>,
    pub mailboxes: Vec<Mailbox>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Mailbox(Mailbox),
    Group(Group),
}

impl Address {
    /// Every mailbox named by this address, looking inside groups.
    pub fn mailboxes(&self) -> &[Mailbox] {
        match self {
            Address::Mailbox(mb) => std::slice::from_ref(mb),
            Address::Group(g) => &g.mailboxes,
        }
    }
}

fn is_dot_atom(s: &str) -> bool {
    matches!(dot_atom_text(s.as_bytes()), Ok((rest, _)) if rest.is_empty())
}

fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

fn needs_quotes(s: &str) -> bool {
    s.bytes()
        .any(|ch| ch != b' ' && (is_special(ch) || !is_atext(ch)))
}

// With a charset, non-ASCII words go out as encoded-words; plain words that
// need it are quoted one by one, since an encoded-word cannot sit inside a
// quoted-string.
fn phrase(words: &[String], charset: Option<&str>) -> String {
    let joined = words.join(" ");
    match charset {
        Some(charset) if !joined.is_ascii() => encode_text(&joined, charset)
            .into_iter()
            .map(|word| if needs_quotes(&word) { quoted(&word) } else { word })
            .join(" "),
        _ if needs_quotes(&joined) => quoted(&joined),
        _ => joined,
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Name(name) => write!(f, "{}", name),
            Domain::Literal(literal) => write!(f, "[{}]", literal),
        }
    }
}

impl Display for AddrSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_dot_atom(&self.local_part) {
            write!(f, "{}", self.local_part)?;
        } else {
            write!(f, "{}", quoted(&self.local_part))?;
        }
        write!(f, "@{}", self.domain)
    }
}

impl Mailbox {
    fn render(&self, charset: Option<&str>) -> String {
        if self.display_name.is_empty() {
            self.addr_spec.to_string()
        } else {
            format!("{} <{}>", phrase(&self.display_name, charset), self.addr_spec)
        }
    }

    /// The wire form, with non-ASCII display-name words as RFC 2047
    /// encoded-words labelled for `charset`.
    pub fn encode(&self, charset: &str) -> String {
        self.render(Some(charset))
    }
}

impl Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(None))
    }
}

impl Group {
    fn render(&self, charset: Option<&str>) -> String {
        let members = self.mailboxes.iter().map(|mb| mb.render(charset)).join(", ");
        if members.is_empty() {
            format!("{}:;", phrase(&self.display_name, charset))
        } else {
            format!("{}: {};", phrase(&self.display_name, charset), members)
        }
    }

    pub fn encode(&self, charset: &str) -> String {
        self.render(Some(charset))
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(None))
    }
}

impl Address {
    pub fn encode(&self, charset: &str) -> String {
        match self {
            Address::Mailbox(mb) => mb.encode(charset),
            Address::Group(g) => g.encode(charset),
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Mailbox(mb) => mb.fmt(f),
            Address::Group(g) => g.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(local: &str, domain: &str) -> AddrSpec {
        AddrSpec {
            local_part: local.to_string(),
            domain: Domain::Name(domain.to_string()),
        }
    }

    #[test]
    fn display_name_with_comma_is_quoted() {
        let mb = Mailbox {
            display_name: vec!["Smith,".to_string(), "John".to_string()],
            addr_spec: spec("john", "example.com"),
        };
        assert_eq!(mb.to_string(), r#""Smith, John" <john@example.com>"#);
    }

    #[test]
    fn local_part_with_space_is_quoted() {
        assert_eq!(spec("john doe", "x.org").to_string(), r#""john doe"@x.org"#);
    }

    #[test]
    fn group_lists_members() {
        let g = Group {
            display_name: vec!["Team".to_string()],
            mailboxes: vec![
                Mailbox {
                    display_name: vec![],
                    addr_spec: spec("a", "b.c"),
                },
                Mailbox {
                    display_name: vec![],
                    addr_spec: spec("d", "e.f"),
                },
            ],
        };
        assert_eq!(g.to_string(), "Team: a@b.c, d@e.f;");
        assert_eq!(g.encode("UTF-8"), "Team: a@b.c, d@e.f;");
        assert_eq!(Address::Group(g).mailboxes().len(), 2);
    }

    #[test]
    fn non_ascii_display_name_is_encoded() {
        let mb = Mailbox {
            display_name: vec!["J\u{f6}rg".to_string()],
            addr_spec: spec("j", "x.com"),
        };
        assert_eq!(mb.to_string(), "J\u{f6}rg <j@x.com>");
        let encoded = mb.encode("UTF-8");
        assert_eq!(encoded, "=?UTF-8?B?SsO2cmc=?= <j@x.com>");
        assert!(encoded.is_ascii());
    }

    #[test]
    fn plain_words_beside_encoded_ones_are_quoted() {
        let mb = Mailbox {
            display_name: vec!["M\u{fc}ller".to_string(), "(Hans)".to_string()],
            addr_spec: spec("h", "x.com"),
        };
        assert_eq!(
            mb.encode("utf-8"),
            r#"=?utf-8?B?TcO8bGxlcg==?= "(Hans)" <h@x.com>"#
        );
    }

    #[test]
    fn ascii_display_name_encodes_as_displayed() {
        let mb = Mailbox {
            display_name: vec!["Smith,".to_string(), "John".to_string()],
            addr_spec: spec("john", "example.com"),
        };
        assert_eq!(mb.encode("UTF-8"), mb.to_string());
    }
}
