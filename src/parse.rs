//! RFC 5322 lexical primitives shared by the structured field grammars.
//!
//! Everything here works on bytes; field bodies are handed over as `&str`
//! and converted back with [`lossy`] once a grammar has matched.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::bytes::complete::take_while;
use nom::bytes::complete::take_while1;
use nom::combinator::all_consuming;
use nom::combinator::map;
use nom::combinator::opt;
use nom::combinator::recognize;
use nom::combinator::value;
use nom::error::Error;
use nom::error::ErrorKind;
use nom::error::ParseError as _;
use nom::multi::fold_many_m_n;
use nom::multi::many0;
use nom::multi::many0_count;
use nom::multi::many1;
use nom::multi::many1_count;
use nom::sequence::tuple;
use nom::Err;
use nom::IResult;

use crate::error::ParseError;

pub mod address;
pub mod date_time;
pub mod message_id;
pub mod mime;

fn is_wsp(ch: u8) -> bool {
    ch == b' ' || ch == b'\t'
}

/// Recognize folding white space - semantically treated as a space
pub fn fws(input: &[u8]) -> IResult<&[u8], ()> {
    let (i, _o) = tuple((
        opt(tuple((take_while(is_wsp), tag(b"\r\n")))),
        take_while1(is_wsp),
    ))(input)?;

    Ok((i, ()))
}

pub fn satisfy_byte<F>(cond: F) -> impl Fn(&[u8]) -> IResult<&[u8], u8>
where
    F: Fn(u8) -> bool,
{
    move |input| {
        if input.is_empty() {
            Err(Err::Error(Error::from_error_kind(input, ErrorKind::Eof)))
        } else {
            let ch = input[0];
            if cond(ch) {
                Ok((&input[1..], input[0]))
            } else {
                Err(Err::Error(Error::from_error_kind(
                    input,
                    ErrorKind::Satisfy,
                )))
            }
        }
    }
}

fn is_vchar(ch: u8) -> bool {
    (0x21..=0x7e).contains(&ch)
}

fn is_quotable(ch: u8) -> bool {
    is_vchar(ch) || is_wsp(ch)
}

pub fn quoted_pair(input: &[u8]) -> IResult<&[u8], u8> {
    let (i, (_backslash, ch)) = tuple((tag(b"\\"), satisfy_byte(is_quotable)))(input)?;
    Ok((i, ch))
}

fn is_ctext(ch: u8) -> bool {
    (33..=39).contains(&ch) || (42..=91).contains(&ch) || (93..=126).contains(&ch) || ch >= 0x80
}

fn ccontent(input: &[u8]) -> IResult<&[u8], ()> {
    alt((
        value((), satisfy_byte(is_ctext)),
        value((), quoted_pair),
        comment,
    ))(input)
}

fn comment(input: &[u8]) -> IResult<&[u8], ()> {
    value(
        (),
        tuple((
            tag(b"("),
            many0_count(tuple((opt(fws), ccontent))),
            opt(fws),
            tag(b")"),
        )),
    )(input)
}

pub fn cfws(input: &[u8]) -> IResult<&[u8], ()> {
    alt((
        value(
            (),
            tuple((many1_count(tuple((opt(fws), comment))), opt(fws))),
        ),
        fws,
    ))(input)
}

// UTF-8 octets are accepted as atext (RFC 6532).
pub fn is_atext(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || b"!#$%&'*+-/=?^_`{|}~".contains(&ch) || ch >= 0x80
}

pub fn is_special(ch: u8) -> bool {
    b"()<>[]:;@\\,.\"".contains(&ch)
}

pub fn atom(input: &[u8]) -> IResult<&[u8], &[u8]> {
    map(
        tuple((opt(cfws), take_while1(is_atext), opt(cfws))),
        |(_, the_atom, _)| the_atom,
    )(input)
}

pub fn dot_atom_text(input: &[u8]) -> IResult<&[u8], &[u8]> {
    // dot-atom-text   =   1*atext *("." 1*atext)
    recognize(tuple((
        take_while1(is_atext),
        many0_count(tuple((tag(b"."), take_while1(is_atext)))),
    )))(input)
}

pub fn dot_atom(input: &[u8]) -> IResult<&[u8], &[u8]> {
    map(
        tuple((opt(cfws), dot_atom_text, opt(cfws))),
        |(_, the_atom, _)| the_atom,
    )(input)
}

fn is_qtext(ch: u8) -> bool {
    ch == 33 || (35..=91).contains(&ch) || (93..=126).contains(&ch) || ch >= 0x80
}

fn qcontent(input: &[u8]) -> IResult<&[u8], u8> {
    alt((satisfy_byte(is_qtext), quoted_pair))(input)
}

pub fn quoted_string(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    map(
        tuple((
            opt(cfws),
            tag(b"\""),
            many0(map(tuple((opt(fws), qcontent)), |(fws, ch)| (fws.is_some(), ch))),
            opt(fws),
            tag(b"\""),
            opt(cfws),
        )),
        |(_, _, chars, _, _, _)| {
            let mut s = Vec::with_capacity(chars.len());
            for (space, ch) in chars {
                if space {
                    s.push(b' ');
                }
                s.push(ch);
            }
            s
        },
    )(input)
}

fn word(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    alt((map(atom, <[u8]>::to_vec), quoted_string))(input)
}

pub fn phrase(input: &[u8]) -> IResult<&[u8], Vec<String>> {
    map(many1(word), |words| words.iter().map(|w| lossy(w)).collect())(input)
}

/// RFC 2045 token character: printable ASCII minus tspecials.
pub fn is_token_char(ch: u8) -> bool {
    is_vchar(ch) && !b"()<>@,;:\\\"/[]?=".contains(&ch)
}

pub fn token(input: &[u8]) -> IResult<&[u8], &[u8]> {
    map(
        tuple((opt(cfws), take_while1(is_token_char), opt(cfws))),
        |(_, the_token, _)| the_token,
    )(input)
}

pub fn number(input: &[u8]) -> IResult<&[u8], u32> {
    fold_many_m_n(1, 9, satisfy_byte(|ch| ch.is_ascii_digit()), 0, |acc, n| {
        acc * 10 + (n - b'0') as u32
    })(input)
}

pub fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Runs `parser` over the whole of `input`, turning any nom failure into a
/// [`ParseError`] for `element`.
pub fn complete<'a, O, F>(element: &str, input: &'a str, parser: F) -> Result<O, ParseError>
where
    F: FnMut(&'a [u8]) -> IResult<&'a [u8], O>,
{
    all_consuming(parser)(input.as_bytes())
        .map(|(_, o)| o)
        .map_err(|e| ParseError::new(element, input, describe(input.as_bytes(), e)))
}

fn describe(input: &[u8], err: Err<Error<&[u8]>>) -> String {
    match err {
        Err::Incomplete(_) => "incomplete input".to_string(),
        Err::Error(e) | Err::Failure(e) => {
            if e.input.is_empty() {
                "unexpected end of input".to_string()
            } else {
                format!(
                    "unexpected input at offset {}: {:?}",
                    input.len() - e.input.len(),
                    String::from_utf8_lossy(e.input)
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_fws() {
        let (i, ()) = super::fws(b"    \r\n   hi!").unwrap();
        assert_eq!(i, b"hi!");
    }

    #[test]
    fn test_cfws_nested_comment() {
        let (i, ()) = super::cfws(b" (a (nested) comment) rest").unwrap();
        assert_eq!(i, b"rest");
    }

    #[test]
    fn test_quoted_string_unescapes() {
        let (i, s) = super::quoted_string(br#" "Smith, \"J\"" <"#).unwrap();
        assert_eq!(s, br#"Smith, "J""#.to_vec());
        assert_eq!(i, b"<");
    }

    #[test]
    fn test_phrase() {
        let (i, p) = super::phrase(b"John \"Q.\" Public <").unwrap();
        assert_eq!(p, vec!["John", "Q.", "Public"]);
        assert_eq!(i, b"<");
    }

    #[test]
    fn test_complete_reports_offset() {
        let err = super::complete("token", "abc def", super::token).unwrap_err();
        assert_eq!(err.element, "token");
        assert_eq!(err.value, "abc def");
        assert!(err.reason.contains("offset 4"), "{}", err.reason);
    }
}
