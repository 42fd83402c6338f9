// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line tokenizer using nom
//!
//! Splits a text record into fields separated by runs of whitespace and/or
//! commas. Fields borrow from the input line.

use nom::{
    bytes::complete::{take_while, take_while1},
    multi::{count, many0},
    sequence::preceded,
    IResult,
};

/// Field separators: any whitespace or a comma
#[inline(always)]
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c == ','
}

/// Skip a (possibly empty) run of delimiters
fn delimiters(input: &str) -> IResult<&str, &str> {
    take_while(is_delimiter)(input)
}

/// One non-empty field
fn field(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !is_delimiter(c))(input)
}

/// Split a line into its fields.
///
/// Leading, trailing and repeated delimiters never produce empty fields.
pub fn tokenize(line: &str) -> Vec<&str> {
    let result: IResult<&str, Vec<&str>> = many0(preceded(delimiters, field))(line);
    match result {
        Ok((_, fields)) => fields,
        Err(_) => Vec::new(),
    }
}

/// Take the first `n` fields and return them with the untouched remainder.
///
/// The remainder has its leading delimiters removed but is otherwise the raw
/// text of the line, so quoted strings keep their inner separators.
/// Returns `None` when the line has fewer than `n` fields.
pub fn split_fields(line: &str, n: usize) -> Option<(Vec<&str>, &str)> {
    let result: IResult<&str, Vec<&str>> = count(preceded(delimiters, field), n)(line);
    let (rest, fields) = result.ok()?;
    let (rest, _) = delimiters(rest).ok()?;
    Some((fields, rest.trim_end()))
}

/// Parse an `int` field
#[inline]
pub fn parse_int(field: &str) -> Option<i32> {
    lexical_core::parse::<i32>(field.as_bytes()).ok()
}

/// Parse a non-negative count field
#[inline]
pub fn parse_count(field: &str) -> Option<usize> {
    lexical_core::parse::<usize>(field.as_bytes()).ok()
}

/// Parse a `double` field
#[inline]
pub fn parse_float(field: &str) -> Option<f64> {
    fast_float::parse::<f64, _>(field).ok()
}
