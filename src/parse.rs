//! Parsers for configuration text: preference directives and properties.

use nom::branch::alt;
use nom::bytes::complete::{is_not, take_till, take_while};
use nom::character::complete::{char, one_of, space0};
use nom::combinator::{eof, rest};
use nom::sequence::{preceded, separated_pair, terminated};
use nom::IResult;

/// `"[Type.]Algorithm : Provider"` split into trimmed key and provider.
///
/// Returns `None` when the colon is missing, a part is empty or the provider
/// contains another colon.
pub(crate) fn directive(input: &str) -> Option<(&str, &str)> {
    let parsed: IResult<&str, (&str, &str)> =
        separated_pair(is_not(":"), char(':'), rest)(input);
    let (_, (key, provider)) = parsed.ok()?;

    let key = key.trim();
    let provider = provider.trim();
    if key.is_empty() || provider.is_empty() || provider.contains(':') {
        return None;
    }
    Some((key, provider))
}

/// Split a directive key at the first dot into `(type, algorithm)`.
///
/// A leading dot is not a separator.
pub(crate) fn split_key(key: &str) -> (Option<&str>, &str) {
    match key.find('.') {
        Some(i) if i > 0 => (Some(&key[..i]), &key[i + 1..]),
        _ => (None, key),
    }
}

/// Provider entry value `"Name [argument]"`.
pub(crate) fn provider_entry(value: &str) -> (&str, &str) {
    let value = value.trim();
    let parsed: IResult<&str, &str> = take_till(|c: char| c.is_whitespace())(value);
    match parsed {
        Ok((argument, name)) => (name, argument.trim()),
        Err(_) => (value, ""),
    }
}

fn is_key_char(c: char) -> bool {
    !c.is_whitespace() && c != '=' && c != ':'
}

fn property(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = space0(input)?;
    let (input, key) = terminated(
        take_while(is_key_char),
        alt((preceded(space0, one_of("=:")), preceded(space0, eof_char))),
    )(input)?;
    let (input, value) = rest(input)?;
    Ok((input, (key, value.trim())))
}

fn eof_char(input: &str) -> IResult<&str, char> {
    let (input, _) = eof(input)?;
    Ok((input, '='))
}

/// Properties document as `(key, value)` pairs in document order.
///
/// Blank lines and lines starting with `#` or `!` are skipped. A line without
/// separator is a key with an empty value.
pub(crate) fn properties(text: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }
        match property(trimmed) {
            Ok((_, (key, value))) if !key.is_empty() => out.push((key, value)),
            _ => warn!("Ignoring malformed property on line {}: {}", n + 1, line),
        }
    }
    out
}
