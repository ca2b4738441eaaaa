//! PDDL surface syntax: a lexer and parser for the typed STRIPS/ADL
//! subset the grounder handles.

mod lexer;
mod parser;

pub use lexer::{PddlLexer, PddlToken};
pub use parser::{Def, PddlParser};
