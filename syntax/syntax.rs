//! Syntactic elements of a lifted, typed PDDL-style planning language.
//!
//! These are the trees the grounder consumes: a `Domain` of typed action
//! schemata and a `Problem` naming the objects the schemata range over.
//! A string parser (see [`pddl`]) may layer whatever surface syntax it
//! likes on top of these elements.

mod lexer;
mod parser;
mod pddl;
mod tokens;

use std::fmt;

pub use lexer::{locate, Lex, Token};
pub use parser::Parse;
pub use pddl::{Def, PddlLexer, PddlParser, PddlToken};
pub use tokens::Tokens;

/// Uninterpreted element that names itself, a type, a predicate,
/// or a variable.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: String) -> Self {
        Symbol(name)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(String::from(s))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A source identifier: its text, the line it was read from, and the
/// numeric id the grounder's numbering pass assigns it. Ids are
/// table-specific; types, constants, predicates, and variables each
/// number from zero.
#[derive(Clone, Debug)]
pub struct Name {
    pub symbol: Symbol,
    pub line: usize,
    pub id: Option<usize>,
}

impl Name {
    pub fn new(symbol: Symbol, line: usize) -> Self {
        Self {
            symbol,
            line,
            id: None,
        }
    }

    pub fn name(&self) -> &str {
        self.symbol.name()
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(Symbol::from(s), 0)
    }
}

/// Source lines do not participate in equality: two occurrences of the
/// same identifier denote the same thing wherever they were read.
impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.id == other.id
    }
}

impl Eq for Name {}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.symbol.fmt(f)
    }
}

/// A name plus its declared super-types. No declared types means the
/// implicit type `object`; more than one means an `either` union.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypedName {
    pub name: Name,
    pub types: Vec<Name>,
}

impl TypedName {
    pub fn new(name: Name, types: impl IntoIterator<Item = Name>) -> Self {
        Self {
            name,
            types: types.into_iter().collect(),
        }
    }
}

impl fmt::Display for TypedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.types.len() {
            0 => self.name.fmt(f),
            1 => f.write_fmt(format_args!("{} - {}", self.name, self.types[0])),
            _ => f.write_fmt(format_args!(
                "{} - (either {})",
                self.name,
                self.types
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            )),
        }
    }
}

/// Declared `:requirements` flags. The parser records the ones it
/// knows and ignores the rest; requirement checking proper is not
/// the grounder's concern.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Requirements {
    pub strips: bool,
    pub typing: bool,
    pub equality: bool,
    pub negative_preconditions: bool,
    pub disjunctive_preconditions: bool,
    pub existential_preconditions: bool,
    pub universal_preconditions: bool,
    pub conditional_effects: bool,
    pub action_costs: bool,
}

impl Requirements {
    /// Set the flag named by a requirement keyword (without the
    /// leading colon). Returns false for unrecognized keywords.
    pub fn set(&mut self, keyword: &str) -> bool {
        match keyword {
            "strips" => self.strips = true,
            "typing" => self.typing = true,
            "equality" => self.equality = true,
            "negative-preconditions" => self.negative_preconditions = true,
            "disjunctive-preconditions" => self.disjunctive_preconditions = true,
            "existential-preconditions" => self.existential_preconditions = true,
            "universal-preconditions" => self.universal_preconditions = true,
            "quantified-preconditions" => {
                self.existential_preconditions = true;
                self.universal_preconditions = true;
            }
            "conditional-effects" => self.conditional_effects = true,
            "action-costs" => self.action_costs = true,
            "adl" => {
                self.strips = true;
                self.typing = true;
                self.equality = true;
                self.negative_preconditions = true;
                self.disjunctive_preconditions = true;
                self.existential_preconditions = true;
                self.universal_preconditions = true;
                self.conditional_effects = true;
            }
            _ => return false,
        }
        true
    }
}

/// A declared predicate: a name and its typed formal arguments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Predicate {
    pub name: Name,
    pub parameters: Vec<TypedName>,
}

impl Predicate {
    pub fn new(name: Name, parameters: impl IntoIterator<Item = TypedName>) -> Self {
        Self {
            name,
            parameters: parameters.into_iter().collect(),
        }
    }
}

/// A lifted action schema.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Action {
    pub name: Name,
    pub parameters: Vec<TypedName>,
    pub precondition: Formula,
    pub effect: Formula,
}

/// A planning domain: the typed vocabulary and the action schemata.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Domain {
    pub name: Name,
    pub requirements: Requirements,
    pub types: Vec<TypedName>,
    pub constants: Vec<TypedName>,
    pub predicates: Vec<Predicate>,
    pub actions: Vec<Action>,
}

/// What the plan should optimize.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Metric {
    #[default]
    Makespan,
    MinimizeCost,
}

/// A planning problem: objects, initial facts, and a goal, posed
/// against a named domain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Problem {
    pub name: Name,
    pub domain: Name,
    pub requirements: Requirements,
    pub objects: Vec<TypedName>,
    pub init: Vec<Formula>,
    pub goal: Formula,
    pub metric: Metric,
}

/// Interpreted element that represents either itself (a constant
/// object) or something else (a variable bound by a parameter list
/// or quantifier). The name's id is an object id for constants and
/// a scope-local slot for variables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Term {
    Variable(Name),
    Constant(Name),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => f.write_fmt(format_args!("?{name}")),
            Self::Constant(name) => name.fmt(f),
        }
    }
}

/// A possibly negated predicate applied to a tuple of terms.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Literal {
    pub predicate: Name,
    pub positive: bool,
    pub args: Vec<Term>,
}

impl Literal {
    pub fn new(predicate: Name, positive: bool, args: impl IntoIterator<Item = Term>) -> Self {
        Self {
            predicate,
            positive,
            args: args.into_iter().collect(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let atom = if self.args.is_empty() {
            format!("({})", self.predicate)
        } else {
            format!(
                "({} {})",
                self.predicate,
                self.args
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            )
        };
        if self.positive {
            f.write_str(&atom)
        } else {
            f.write_fmt(format_args!("(not {atom})"))
        }
    }
}

/// The single scalar bookkeeping operation on `total-cost`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssignOp {
    Assign,
    Increase,
}

/// A precondition or effect tree. `And`/`Or` are binary and
/// right-associated; the parser folds n-ary source forms into this
/// chain. `When` only makes sense on the effect side and `Assign`
/// exists solely for `total-cost` bookkeeping.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Formula {
    True,
    False,
    Literal(Literal),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
    Not(Box<Formula>),
    Forall(TypedName, Box<Formula>),
    Exists(TypedName, Box<Formula>),
    When(Box<Formula>, Box<Formula>),
    Assign(AssignOp, Name, i64),
}

impl Formula {
    pub fn lit(predicate: Name, positive: bool, args: impl IntoIterator<Item = Term>) -> Self {
        Self::Literal(Literal::new(predicate, positive, args))
    }

    /// Boxing constructor.
    pub fn and(l: Formula, r: Formula) -> Self {
        Self::And(Box::new(l), Box::new(r))
    }

    /// Boxing constructor.
    pub fn or(l: Formula, r: Formula) -> Self {
        Self::Or(Box::new(l), Box::new(r))
    }

    /// Boxing constructor.
    pub fn not(f: Formula) -> Self {
        Self::Not(Box::new(f))
    }

    /// Boxing constructor.
    pub fn forall(var: TypedName, f: Formula) -> Self {
        Self::Forall(var, Box::new(f))
    }

    /// Boxing constructor.
    pub fn exists(var: TypedName, f: Formula) -> Self {
        Self::Exists(var, Box::new(f))
    }

    /// Boxing constructor.
    pub fn when(condition: Formula, effect: Formula) -> Self {
        Self::When(Box::new(condition), Box::new(effect))
    }

    /// Fold a sequence of conjuncts into a right-associated `And`
    /// chain. An empty conjunction is `True`.
    pub fn conjoin(fs: impl IntoIterator<Item = Formula>) -> Self {
        fs.into_iter()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .reduce(|r, l| Self::and(l, r))
            .unwrap_or(Self::True)
    }

    /// Fold a sequence of disjuncts into a right-associated `Or`
    /// chain. An empty disjunction is `False`.
    pub fn disjoin(fs: impl IntoIterator<Item = Formula>) -> Self {
        fs.into_iter()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .reduce(|r, l| Self::or(l, r))
            .unwrap_or(Self::False)
    }
}

impl From<Literal> for Formula {
    fn from(l: Literal) -> Self {
        Self::Literal(l)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Formula::*;
        match self {
            True => f.write_str("(and)"),
            False => f.write_str("(or)"),
            Literal(l) => l.fmt(f),
            And(l, r) => f.write_fmt(format_args!("(and {l} {r})")),
            Or(l, r) => f.write_fmt(format_args!("(or {l} {r})")),
            Not(x) => f.write_fmt(format_args!("(not {x})")),
            Forall(v, x) => f.write_fmt(format_args!("(forall (?{v}) {x})")),
            Exists(v, x) => f.write_fmt(format_args!("(exists (?{v}) {x})")),
            When(c, e) => f.write_fmt(format_args!("(when {c} {e})")),
            Assign(AssignOp::Assign, l, r) => f.write_fmt(format_args!("(= ({l}) {r})")),
            Assign(AssignOp::Increase, l, r) => {
                f.write_fmt(format_args!("(increase ({l}) {r})"))
            }
        }
    }
}

/// These constructor macros can make tests involving syntactic elements
/// (most of them) much more readable. They are *not* intended as a public
/// interface, and *should* be behind `#[cfg(test)]`, but [cargo can't
/// currently export test code across crates](https://github.com/rust-lang/cargo/issues/8379).
#[cfg(any(test, feature = "macros"))]
mod macros {
    #[macro_export]
    macro_rules! name {
        ($name: ident) => {
            Name::from(stringify!($name))
        };
    }

    #[macro_export]
    macro_rules! typed {
        ($name: ident) => {
            TypedName::new(name!($name), [])
        };
        ($name: ident: $($ty: ident)|+) => {
            TypedName::new(name!($name), [$(name!($ty)),+])
        };
    }

    #[macro_export]
    macro_rules! var {
        ($name: ident) => {
            Term::Variable(name!($name))
        };
    }

    #[macro_export]
    macro_rules! obj {
        ($name: ident) => {
            Term::Constant(name!($name))
        };
    }

    #[macro_export]
    macro_rules! lit {
        ($pred: ident $(($($arg: expr),*))?) => {
            Formula::lit(name!($pred), true, [$($($arg),*)?])
        };
    }

    #[macro_export]
    macro_rules! nlit {
        ($pred: ident $(($($arg: expr),*))?) => {
            Formula::lit(name!($pred), false, [$($($arg),*)?])
        };
    }

    #[macro_export]
    macro_rules! and {
        ($($f: expr),+ $(,)?) => {
            Formula::conjoin([$($f),+])
        };
    }

    #[macro_export]
    macro_rules! or {
        ($($f: expr),+ $(,)?) => {
            Formula::disjoin([$($f),+])
        };
    }

    #[macro_export]
    macro_rules! not {
        ($f: expr) => {
            Formula::not($f)
        };
    }

    #[macro_export]
    macro_rules! forall {
        ($var: ident: $($ty: ident)|+, $f: expr) => {
            Formula::forall(typed!($var: $($ty)|+), $f)
        };
    }

    #[macro_export]
    macro_rules! exists {
        ($var: ident: $($ty: ident)|+, $f: expr) => {
            Formula::exists(typed!($var: $($ty)|+), $f)
        };
    }

    #[macro_export]
    macro_rules! when {
        ($cond: expr, $eff: expr) => {
            Formula::when($cond, $eff)
        };
    }
}
