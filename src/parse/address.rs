use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::map;
use nom::combinator::opt;
use nom::multi::many0;
use nom::multi::separated_list1;
use nom::sequence::delimited;
use nom::sequence::tuple;
use nom::IResult;

use super::cfws;
use super::dot_atom;
use super::fws;
use super::lossy;
use super::phrase;
use super::quoted_string;
use super::satisfy_byte;

use crate::headers::address::{AddrSpec, Address, Domain, Group, Mailbox};

fn local_part(input: &[u8]) -> IResult<&[u8], String> {
    alt((map(dot_atom, lossy), map(quoted_string, |s| lossy(&s))))(input)
}

fn is_dtext(ch: u8) -> bool {
    (33..=90).contains(&ch) || (94..=126).contains(&ch)
}

fn domain_literal(input: &[u8]) -> IResult<&[u8], String> {
    map(
        delimited(
            tuple((opt(cfws), tag(b"["))),
            many0(delimited(opt(fws), satisfy_byte(is_dtext), opt(fws))),
            tuple((tag(b"]"), opt(cfws))),
        ),
        |literal| lossy(&literal),
    )(input)
}

pub fn domain(input: &[u8]) -> IResult<&[u8], Domain> {
    alt((
        map(dot_atom, |name| Domain::Name(lossy(name))),
        map(domain_literal, Domain::Literal),
    ))(input)
}

pub fn addr_spec(input: &[u8]) -> IResult<&[u8], AddrSpec> {
    map(
        tuple((local_part, tag(b"@"), domain)),
        |(local_part, _, domain)| AddrSpec { local_part, domain },
    )(input)
}

pub fn angle_addr(input: &[u8]) -> IResult<&[u8], AddrSpec> {
    delimited(
        tuple((opt(cfws), tag(b"<"))),
        addr_spec,
        tuple((tag(b">"), opt(cfws))),
    )(input)
}

pub fn mailbox(input: &[u8]) -> IResult<&[u8], Mailbox> {
    let name_addr = tuple((opt(phrase), angle_addr));

    map(
        alt((name_addr, map(addr_spec, |spec| (None, spec)))),
        |(display_name, addr_spec)| Mailbox {
            display_name: display_name.unwrap_or_default(),
            addr_spec,
        },
    )(input)
}

pub fn group(input: &[u8]) -> IResult<&[u8], Group> {
    map(
        tuple((
            phrase,
            tag(b":"),
            opt(separated_list1(tag(b","), mailbox)),
            opt(cfws),
            tag(b";"),
            opt(cfws),
        )),
        |(display_name, _, mailboxes, _, _, _)| Group {
            display_name,
            mailboxes: mailboxes.unwrap_or_default(),
        },
    )(input)
}

pub fn address(input: &[u8]) -> IResult<&[u8], Address> {
    alt((map(mailbox, Address::Mailbox), map(group, Address::Group)))(input)
}

pub fn address_list(input: &[u8]) -> IResult<&[u8], Vec<Address>> {
    separated_list1(tag(b","), address)(input)
}

/// `"<" [CFWS] ">"` or an angle-addr, as found in Return-Path.
pub fn path(input: &[u8]) -> IResult<&[u8], Option<AddrSpec>> {
    alt((
        map(angle_addr, Some),
        map(
            tuple((opt(cfws), tag(b"<"), opt(cfws), tag(b">"), opt(cfws))),
            |_| None,
        ),
    ))(input)
}
