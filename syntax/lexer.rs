//! Tokenize a string representation of a domain or problem.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace1},
    combinator::{map_res, recognize},
    error::ParseError,
    multi::{many0, many0_count},
    sequence::{pair, preceded},
    IResult, Parser,
};

use crate::Symbol;

/// A `;` comment runs to the end of the line.
fn comment(input: &str) -> IResult<&str, &str> {
    recognize(preceded(char(';'), take_while(|c| c != '\n')))(input)
}

pub(crate) fn space(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((multispace1, comment))))(input)
}

/// PDDL identifiers start with a letter and may contain hyphens
/// and underscores (e.g., `total-cost`).
pub(crate) fn symbol(input: &str) -> IResult<&str, Symbol> {
    let (input, name) = recognize(pair(
        alpha1,
        many0_count(alt((alphanumeric1, tag("-"), tag("_")))),
    ))(input)?;
    Ok((input, Symbol::new(name.to_owned())))
}

pub(crate) fn integer(input: &str) -> IResult<&str, i64> {
    map_res(digit1, |digits: &str| digits.parse::<i64>())(input)
}

pub(crate) fn token<I, O, E, F>(mut parser: F) -> impl FnMut(I) -> IResult<I, Token<O, I>, E>
where
    I: Clone,
    O: Clone,
    E: ParseError<I>,
    F: Parser<I, O, E>,
{
    move |input: I| {
        let i = input.clone();
        let (input, t) = parser.parse(input)?;
        Ok((input, Token::new(t, i)))
    }
}

/// Define a parser combinator for a token denoted by a tag.
#[macro_export]
macro_rules! lex_token {
    ($function: ident<$ty: ty>, $tag: literal, $token: expr) => {
        pub(crate) fn $function(input: &str) -> IResult<&str, $crate::Token<$ty, &str>> {
            $crate::lexer::token(::nom::combinator::map(
                ::nom::bytes::complete::tag($tag),
                |_| $token,
            ))(input)
        }
    };
}

/// A token with source information.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token<T: Clone, S: Clone> {
    pub token: T,
    pub source: S,
}

impl<T: Clone, S: Clone> Token<T, S> {
    pub fn new(token: T, source: S) -> Self {
        Self { token, source }
    }
}

/// A lexer, a.k.a. lexical analyzer, tokenizer.
pub trait Lex<'a, S> {
    type Input;
    type Token;

    /// Tokenize an input stream.
    fn lex(input: Self::Input) -> IResult<Self::Input, Vec<Self::Token>>;
}

/// Resolve each token's source slice to the 1-based line it starts on.
/// The numbering pass reports undeclared and unbound names by line.
pub fn locate<'a, T: Clone>(
    input: &'a str,
    tokens: Vec<Token<T, &'a str>>,
) -> Vec<Token<T, usize>> {
    let mut line = 1;
    let mut from = 0;
    tokens
        .into_iter()
        .map(|t| {
            let offset = t.source.as_ptr() as usize - input.as_ptr() as usize;
            line += input[from..offset].bytes().filter(|&b| b == b'\n').count();
            from = offset;
            Token::new(t.token, line)
        })
        .collect()
}
