//! PDDL tokens and tokenizer.

use nom::{
    branch::alt,
    character::complete::char,
    combinator::map,
    multi::many0,
    sequence::{delimited, preceded},
    IResult, InputLength,
};

use crate::lexer::{integer, space, symbol, token, Lex, Token};
use crate::{lex_token, Symbol};

/// Lexical element of a PDDL file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PddlToken {
    /// A bare identifier (also covers reserved words like `define`).
    Symbol(Symbol),
    /// A `?variable`.
    Variable(Symbol),
    /// A `:keyword` (section markers like `:action`).
    Keyword(Symbol),
    Integer(i64),
    Dash,
    Eq,
    LParen,
    RParen,
}

impl InputLength for PddlToken {
    #[inline]
    fn input_len(&self) -> usize {
        1
    }
}

lex_token!(lparen<PddlToken>, "(", PddlToken::LParen);
lex_token!(rparen<PddlToken>, ")", PddlToken::RParen);
lex_token!(dash<PddlToken>, "-", PddlToken::Dash);
lex_token!(eq<PddlToken>, "=", PddlToken::Eq);

fn variable(input: &str) -> IResult<&str, Token<PddlToken, &str>> {
    token(map(preceded(char('?'), symbol), PddlToken::Variable))(input)
}

fn keyword(input: &str) -> IResult<&str, Token<PddlToken, &str>> {
    token(map(preceded(char(':'), symbol), PddlToken::Keyword))(input)
}

/// PDDL lexer.
pub struct PddlLexer;

impl<'a> Lex<'a, &str> for PddlLexer {
    type Input = &'a str;
    type Token = Token<PddlToken, &'a str>;

    /// Tokenize a string representation of a domain or problem.
    fn lex(input: &'a str) -> IResult<&'a str, Vec<Self::Token>> {
        many0(delimited(
            space,
            alt((
                lparen,
                rparen,
                dash,
                eq,
                variable,
                keyword,
                token(map(integer, PddlToken::Integer)),
                token(map(symbol, PddlToken::Symbol)),
            )),
            space,
        ))(input)
    }
}
