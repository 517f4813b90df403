use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::bytes::complete::take_while;
use nom::combinator::map;
use nom::combinator::opt;
use nom::combinator::recognize;
use nom::multi::many1;
use nom::sequence::delimited;
use nom::sequence::tuple;
use nom::IResult;

use super::cfws;
use super::dot_atom_text;
use super::lossy;

fn is_dtext(ch: u8) -> bool {
    (33..=90).contains(&ch) || (94..=126).contains(&ch)
}

fn no_fold_literal(input: &[u8]) -> IResult<&[u8], &[u8]> {
    recognize(tuple((tag(b"["), take_while(is_dtext), tag(b"]"))))(input)
}

/// `[CFWS] "<" id-left "@" id-right ">" [CFWS]`, yielding the text between
/// the angle brackets.
pub fn msg_id(input: &[u8]) -> IResult<&[u8], String> {
    map(
        delimited(
            tuple((opt(cfws), tag(b"<"))),
            recognize(tuple((
                dot_atom_text,
                tag(b"@"),
                alt((dot_atom_text, no_fold_literal)),
            ))),
            tuple((tag(b">"), opt(cfws))),
        ),
        lossy,
    )(input)
}

pub fn msg_id_list(input: &[u8]) -> IResult<&[u8], Vec<String>> {
    many1(msg_id)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_id() {
        let (i, id) =
            msg_id(b"<422f4e65-56da-24e2-3467-f60f2cc4d943@umanwizard.com>").unwrap();
        assert!(i.is_empty());
        assert_eq!(id, "422f4e65-56da-24e2-3467-f60f2cc4d943@umanwizard.com");
    }

    #[test]
    fn test_literal_right() {
        let (_, id) = msg_id(b" <abc@[127.0.0.1]> ").unwrap();
        assert_eq!(id, "abc@[127.0.0.1]");
    }

    #[test]
    fn test_list() {
        let (i, ids) = msg_id_list(b"<a@b> (first)\t<c@d>").unwrap();
        assert!(i.is_empty());
        assert_eq!(ids, vec!["a@b", "c@d"]);
    }

    #[test]
    fn test_missing_at() {
        assert!(msg_id(b"<nope>").is_err());
    }
}
