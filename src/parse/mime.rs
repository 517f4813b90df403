//! RFC 2045/2183 grammars: media types, dispositions, parameters,
//! MIME-Version and Content-Transfer-Encoding.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::map;
use nom::combinator::opt;
use nom::multi::many0;
use nom::sequence::preceded;
use nom::sequence::tuple;
use nom::IResult;

use super::cfws;
use super::lossy;
use super::number;
use super::quoted_string;
use super::token;

fn parameter_value(input: &[u8]) -> IResult<&[u8], String> {
    alt((map(token, lossy), map(quoted_string, |s| lossy(&s))))(input)
}

/// `attribute "=" value`; attribute names are case-insensitive and come
/// back lowercased.
pub fn parameter(input: &[u8]) -> IResult<&[u8], (String, String)> {
    map(
        tuple((token, tag(b"="), parameter_value)),
        |(attribute, _, value)| (lossy(attribute).to_ascii_lowercase(), value),
    )(input)
}

/// `*(";" parameter) [";"]`; a dangling semicolon is tolerated.
pub fn parameters(input: &[u8]) -> IResult<&[u8], Vec<(String, String)>> {
    map(
        tuple((
            many0(preceded(tag(b";"), parameter)),
            opt(tuple((tag(b";"), opt(cfws)))),
        )),
        |(params, _)| params,
    )(input)
}

pub fn media_type(input: &[u8]) -> IResult<&[u8], (String, String, Vec<(String, String)>)> {
    map(
        tuple((token, tag(b"/"), token, parameters)),
        |(main, _, sub, params)| {
            (
                lossy(main).to_ascii_lowercase(),
                lossy(sub).to_ascii_lowercase(),
                params,
            )
        },
    )(input)
}

pub fn disposition(input: &[u8]) -> IResult<&[u8], (String, Vec<(String, String)>)> {
    map(tuple((token, parameters)), |(kind, params)| {
        (lossy(kind).to_ascii_lowercase(), params)
    })(input)
}

pub fn mime_version(input: &[u8]) -> IResult<&[u8], (u32, u32)> {
    map(
        tuple((
            opt(cfws),
            number,
            opt(cfws),
            tag(b"."),
            opt(cfws),
            number,
            opt(cfws),
        )),
        |(_, major, _, _, _, minor, _)| (major, minor),
    )(input)
}

pub fn mechanism(input: &[u8]) -> IResult<&[u8], String> {
    map(token, |t| lossy(t).to_ascii_lowercase())(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type() {
        let (i, (main, sub, params)) =
            media_type(b"text/plain; charset=utf-8; format=flowed").unwrap();
        assert!(i.is_empty());
        assert_eq!(main, "text");
        assert_eq!(sub, "plain");
        assert_eq!(
            params,
            vec![
                ("charset".to_string(), "utf-8".to_string()),
                ("format".to_string(), "flowed".to_string())
            ]
        );
    }

    #[test]
    fn test_quoted_parameter_and_case() {
        let (i, (main, sub, params)) =
            media_type(b"Multipart/Mixed; Boundary=\"a b;c\";").unwrap();
        assert!(i.is_empty());
        assert_eq!((main.as_str(), sub.as_str()), ("multipart", "mixed"));
        assert_eq!(params, vec![("boundary".to_string(), "a b;c".to_string())]);
    }

    #[test]
    fn test_disposition() {
        let (i, (kind, params)) = disposition(b"attachment; filename=\"x y.txt\"").unwrap();
        assert!(i.is_empty());
        assert_eq!(kind, "attachment");
        assert_eq!(params[0].1, "x y.txt");
    }

    #[test]
    fn test_mime_version_with_comment() {
        let (i, v) = mime_version(b"1.0 (produced by mailfield)").unwrap();
        assert!(i.is_empty());
        assert_eq!(v, (1, 0));
    }
}
