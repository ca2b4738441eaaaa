//! Parse a stream of lexed tokens with
//! [nom](https://crates.io/crates/nom).

use nom::IResult;

use crate::{Token, Tokens};

/// An input stream to a parser: a slice of tokens, each annotated
/// with some source information.
pub type Input<'a, T, S> = Tokens<'a, Token<T, S>>;

/// A parser from tokens to syntax trees, generic over the source
/// annotation the tokens carry (a raw input slice straight from the
/// lexer, or a resolved line number; see [`crate::locate`]).
pub trait Parse<'a, S: Clone> {
    /// The lexical (input) token type being parsed.
    type Token: Clone;

    /// The syntax tree (output) type.
    type Tree;

    /// Parse a token stream.
    fn parse(
        input: Input<'a, Self::Token, S>,
    ) -> IResult<Input<'a, Self::Token, S>, Vec<Self::Tree>>;
}

/// Define a parser combinator that recognizes one specific token.
#[macro_export]
macro_rules! parse_token {
    ($function:ident<$ty: ty>, $tag: expr) => {
        fn $function<S: Clone>(
            input: Tokens<Token<$ty, S>>,
        ) -> IResult<Tokens<Token<$ty, S>>, Tokens<Token<$ty, S>>> {
            ::nom::combinator::verify(
                ::nom::bytes::complete::take(1_usize),
                |t: &Tokens<Token<$ty, S>>| matches!(t.first(), Some(t) if t.token == $tag),
            )(input)
        }
    };
}
