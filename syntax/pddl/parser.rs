//! PDDL parser.
//!
//! Produces the lifted trees the grounder consumes. Only structural
//! validity is enforced here; undeclared names and unbound variables
//! are caught later, by the grounder's numbering pass.

use nom::{
    branch::alt,
    bytes::complete::take,
    combinator::{eof, map, opt},
    error::{Error, ErrorKind},
    multi::{many0, many1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Err, IResult,
};

use crate::{
    parse_token, Action, AssignOp, Domain, Formula, Metric, Name, Parse, Predicate, Problem,
    Requirements, Symbol, Term, Token, Tokens, TypedName,
};

use super::lexer::PddlToken;

/// Local alias: tokens annotated with their 1-based source line.
type Input<'a> = crate::parser::Input<'a, PddlToken, usize>;

/// A top-level `define` form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Def {
    Domain(Domain),
    Problem(Problem),
}

/// PDDL parser.
pub struct PddlParser;

impl<'a> Parse<'a, usize> for PddlParser {
    type Token = PddlToken;
    type Tree = Def;

    /// Parse a token stream as a sequence of `define` forms.
    fn parse(input: Input<'a>) -> IResult<Input<'a>, Vec<Def>> {
        terminated(many0(def), eof)(input)
    }
}

parse_token!(lparen<PddlToken>, PddlToken::LParen);
parse_token!(rparen<PddlToken>, PddlToken::RParen);
parse_token!(dash<PddlToken>, PddlToken::Dash);
parse_token!(eq<PddlToken>, PddlToken::Eq);

fn name(input: Input) -> IResult<Input, Name> {
    let (rest, tokens) = take(1_usize)(input)?;
    match tokens.first() {
        Some(Token {
            token: PddlToken::Symbol(s),
            source,
        }) => Ok((rest, Name::new(s.clone(), *source))),
        _ => Err(Err::Error(Error::new(input, ErrorKind::Fail))),
    }
}

fn variable(input: Input) -> IResult<Input, Name> {
    let (rest, tokens) = take(1_usize)(input)?;
    match tokens.first() {
        Some(Token {
            token: PddlToken::Variable(s),
            source,
        }) => Ok((rest, Name::new(s.clone(), *source))),
        _ => Err(Err::Error(Error::new(input, ErrorKind::Fail))),
    }
}

fn integer(input: Input) -> IResult<Input, i64> {
    let (rest, tokens) = take(1_usize)(input)?;
    match tokens.first().map(|t| &t.token) {
        Some(PddlToken::Integer(i)) => Ok((rest, *i)),
        _ => Err(Err::Error(Error::new(input, ErrorKind::Fail))),
    }
}

/// Recognize a reserved word, which lexes as an ordinary symbol.
fn word<'a>(input: Input<'a>, w: &str) -> IResult<Input<'a>, ()> {
    let (rest, tokens) = take(1_usize)(input)?;
    match tokens.first().map(|t| &t.token) {
        Some(PddlToken::Symbol(s)) if s.name() == w => Ok((rest, ())),
        _ => Err(Err::Error(Error::new(input, ErrorKind::Fail))),
    }
}

/// Recognize a specific `:keyword`.
fn kw<'a>(input: Input<'a>, w: &str) -> IResult<Input<'a>, ()> {
    let (rest, tokens) = take(1_usize)(input)?;
    match tokens.first().map(|t| &t.token) {
        Some(PddlToken::Keyword(s)) if s.name() == w => Ok((rest, ())),
        _ => Err(Err::Error(Error::new(input, ErrorKind::Fail))),
    }
}

/// Recognize any `:keyword` and yield its symbol.
fn any_kw(input: Input) -> IResult<Input, Symbol> {
    let (rest, tokens) = take(1_usize)(input)?;
    match tokens.first().map(|t| &t.token) {
        Some(PddlToken::Keyword(s)) => Ok((rest, s.clone())),
        _ => Err(Err::Error(Error::new(input, ErrorKind::Fail))),
    }
}

fn def(input: Input) -> IResult<Input, Def> {
    alt((map(domain_def, Def::Domain), map(problem_def, Def::Problem)))(input)
}

// Typed lists: `a b - t c d - (either t1 t2) e`. Names in a trailing
// group with no `- type` get an empty type list (implicitly `object`).

fn kind(input: Input) -> IResult<Input, Vec<Name>> {
    alt((
        map(name, |n| vec![n]),
        delimited(
            lparen,
            preceded(|i| word(i, "either"), many1(name)),
            rparen,
        ),
    ))(input)
}

fn typed_list<'a>(
    element: fn(Input<'a>) -> IResult<Input<'a>, Name>,
    input: Input<'a>,
) -> IResult<Input<'a>, Vec<TypedName>> {
    map(
        many0(pair(many1(element), opt(preceded(dash, kind)))),
        |groups| {
            groups
                .into_iter()
                .flat_map(|(names, kinds)| {
                    let kinds = kinds.unwrap_or_default();
                    names
                        .into_iter()
                        .map(move |n| TypedName::new(n, kinds.clone()))
                        .collect::<Vec<_>>()
                })
                .collect()
        },
    )(input)
}

fn typed_names(input: Input) -> IResult<Input, Vec<TypedName>> {
    typed_list(name, input)
}

fn typed_vars(input: Input) -> IResult<Input, Vec<TypedName>> {
    typed_list(variable, input)
}

// Formulas.

fn term(input: Input) -> IResult<Input, Term> {
    alt((map(variable, Term::Variable), map(name, Term::Constant)))(input)
}

fn atom(input: Input) -> IResult<Input, Formula> {
    map(
        delimited(lparen, pair(name, many0(term)), rparen),
        |(predicate, args)| Formula::lit(predicate, true, args),
    )(input)
}

fn conjunction(input: Input) -> IResult<Input, Formula> {
    map(
        delimited(lparen, preceded(|i| word(i, "and"), many0(formula)), rparen),
        Formula::conjoin,
    )(input)
}

fn disjunction(input: Input) -> IResult<Input, Formula> {
    map(
        delimited(lparen, preceded(|i| word(i, "or"), many0(formula)), rparen),
        Formula::disjoin,
    )(input)
}

/// `(not <atom>)` folds to a negative literal; `not` over anything
/// else stays a `Not` node for the normalizer to push down.
fn negation(input: Input) -> IResult<Input, Formula> {
    map(
        delimited(lparen, preceded(|i| word(i, "not"), formula), rparen),
        |f| match f {
            Formula::Literal(mut l) => {
                l.positive = !l.positive;
                Formula::Literal(l)
            }
            f => Formula::not(f),
        },
    )(input)
}

fn binders(input: Input) -> IResult<Input, Vec<TypedName>> {
    delimited(lparen, typed_vars, rparen)(input)
}

/// Multi-variable quantifiers fold to a nest of single-variable ones.
fn universal(input: Input) -> IResult<Input, Formula> {
    map(
        delimited(
            lparen,
            preceded(|i| word(i, "forall"), pair(binders, formula)),
            rparen,
        ),
        |(vars, f)| vars.into_iter().rev().fold(f, |f, v| Formula::forall(v, f)),
    )(input)
}

fn existential(input: Input) -> IResult<Input, Formula> {
    map(
        delimited(
            lparen,
            preceded(|i| word(i, "exists"), pair(binders, formula)),
            rparen,
        ),
        |(vars, f)| vars.into_iter().rev().fold(f, |f, v| Formula::exists(v, f)),
    )(input)
}

fn conditional(input: Input) -> IResult<Input, Formula> {
    map(
        delimited(
            lparen,
            preceded(|i| word(i, "when"), pair(formula, formula)),
            rparen,
        ),
        |(condition, effect)| Formula::when(condition, effect),
    )(input)
}

fn assign_op(input: Input) -> IResult<Input, AssignOp> {
    alt((
        map(|i| word(i, "increase"), |_| AssignOp::Increase),
        map(eq, |_| AssignOp::Assign),
    ))(input)
}

fn fluent(input: Input) -> IResult<Input, Name> {
    delimited(lparen, name, rparen)(input)
}

fn assignment(input: Input) -> IResult<Input, Formula> {
    map(
        delimited(lparen, tuple((assign_op, fluent, integer)), rparen),
        |(op, lval, rval)| Formula::Assign(op, lval, rval),
    )(input)
}

fn formula(input: Input) -> IResult<Input, Formula> {
    alt((
        conjunction,
        disjunction,
        negation,
        universal,
        existential,
        conditional,
        assignment,
        atom,
    ))(input)
}

// Domains.

fn requirements(input: Input) -> IResult<Input, Requirements> {
    map(
        opt(delimited(
            lparen,
            preceded(|i| kw(i, "requirements"), many0(any_kw)),
            rparen,
        )),
        |kws| {
            let mut reqs = Requirements::default();
            for k in kws.into_iter().flatten() {
                reqs.set(k.name());
            }
            reqs
        },
    )(input)
}

fn predicate(input: Input) -> IResult<Input, Predicate> {
    map(
        delimited(lparen, pair(name, typed_vars), rparen),
        |(name, parameters)| Predicate { name, parameters },
    )(input)
}

fn action(input: Input) -> IResult<Input, Action> {
    map(
        delimited(
            lparen,
            preceded(
                |i| kw(i, "action"),
                tuple((
                    name,
                    preceded(
                        |i| kw(i, "parameters"),
                        delimited(lparen, typed_vars, rparen),
                    ),
                    opt(preceded(|i| kw(i, "precondition"), formula)),
                    preceded(|i| kw(i, "effect"), formula),
                )),
            ),
            rparen,
        ),
        |(name, parameters, precondition, effect)| Action {
            name,
            parameters,
            precondition: precondition.unwrap_or(Formula::True),
            effect,
        },
    )(input)
}

fn domain_def(input: Input) -> IResult<Input, Domain> {
    delimited(
        lparen,
        preceded(
            |i| word(i, "define"),
            map(
                tuple((
                    delimited(lparen, preceded(|i| word(i, "domain"), name), rparen),
                    requirements,
                    opt(delimited(
                        lparen,
                        preceded(|i| kw(i, "types"), typed_names),
                        rparen,
                    )),
                    opt(delimited(
                        lparen,
                        preceded(|i| kw(i, "constants"), typed_names),
                        rparen,
                    )),
                    opt(delimited(
                        lparen,
                        preceded(|i| kw(i, "predicates"), many1(predicate)),
                        rparen,
                    )),
                    many0(action),
                )),
                |(name, requirements, types, constants, predicates, actions)| Domain {
                    name,
                    requirements,
                    types: types.unwrap_or_default(),
                    constants: constants.unwrap_or_default(),
                    predicates: predicates.unwrap_or_default(),
                    actions,
                },
            ),
        ),
        rparen,
    )(input)
}

// Problems.

fn metric(input: Input) -> IResult<Input, Metric> {
    map(
        opt(delimited(
            lparen,
            preceded(
                |i| kw(i, "metric"),
                preceded(
                    |i| word(i, "minimize"),
                    delimited(lparen, |i| word(i, "total-cost"), rparen),
                ),
            ),
            rparen,
        )),
        |m| match m {
            Some(()) => Metric::MinimizeCost,
            None => Metric::Makespan,
        },
    )(input)
}

fn problem_def(input: Input) -> IResult<Input, Problem> {
    delimited(
        lparen,
        preceded(
            |i| word(i, "define"),
            map(
                tuple((
                    delimited(lparen, preceded(|i| word(i, "problem"), name), rparen),
                    delimited(lparen, preceded(|i| kw(i, "domain"), name), rparen),
                    requirements,
                    opt(delimited(
                        lparen,
                        preceded(|i| kw(i, "objects"), typed_names),
                        rparen,
                    )),
                    delimited(lparen, preceded(|i| kw(i, "init"), many0(formula)), rparen),
                    delimited(lparen, preceded(|i| kw(i, "goal"), formula), rparen),
                    metric,
                )),
                |(name, domain, requirements, objects, init, goal, metric)| Problem {
                    name,
                    domain,
                    requirements,
                    objects: objects.unwrap_or_default(),
                    init,
                    goal,
                    metric,
                },
            ),
        ),
        rparen,
    )(input)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{locate, Lex as _, PddlLexer};

    fn parse(input: &str) -> Vec<Def> {
        let (rest, tokens) = PddlLexer::lex(input).expect("lex");
        assert_eq!(rest, "", "unconsumed characters");
        let tokens = locate(input, tokens);
        let (rest, defs) = PddlParser::parse(Tokens::new(&tokens[..])).expect("parse");
        assert!(rest.is_empty(), "unconsumed tokens");
        defs
    }

    const BLOCKS_DOMAIN: &str = r#"
        (define (domain blocks)
          (:requirements :strips :typing)
          (:types block - object)
          (:predicates (on-table ?x - block) (clear ?x - block))
          (:action pickup
            :parameters (?x - block)
            :precondition (and (on-table ?x) (clear ?x))
            :effect (not (on-table ?x))))
    "#;

    const BLOCKS_PROBLEM: &str = r#"
        (define (problem blocks-2)
          (:domain blocks)
          (:objects a b - block)
          (:init (on-table a) (on-table b) (clear a) (clear b))
          (:goal (not (on-table a)))
          (:metric minimize (total-cost)))
    "#;

    #[test]
    fn blocks_domain() {
        let defs = parse(BLOCKS_DOMAIN);
        assert_eq!(defs.len(), 1);
        let Def::Domain(domain) = &defs[0] else {
            panic!("expected a domain");
        };
        assert_eq!(domain.name, Name::from("blocks"));
        assert!(domain.requirements.strips && domain.requirements.typing);
        assert_eq!(
            domain.types,
            vec![TypedName::new(Name::from("block"), [Name::from("object")])]
        );
        assert_eq!(domain.predicates.len(), 2);
        assert_eq!(domain.actions.len(), 1);

        let action = &domain.actions[0];
        assert_eq!(action.name, Name::from("pickup"));
        assert_eq!(
            action.parameters,
            vec![TypedName::new(Name::from("x"), [Name::from("block")])]
        );
        assert_eq!(
            action.precondition,
            Formula::and(
                Formula::lit(Name::from("on-table"), true, [Term::Variable(Name::from("x"))]),
                Formula::lit(Name::from("clear"), true, [Term::Variable(Name::from("x"))]),
            ),
            "n-ary and folds to a binary chain"
        );
        assert_eq!(
            action.effect,
            Formula::lit(Name::from("on-table"), false, [Term::Variable(Name::from("x"))]),
            "(not atom) folds to a negative literal"
        );
    }

    #[test]
    fn blocks_problem() {
        let defs = parse(BLOCKS_PROBLEM);
        assert_eq!(defs.len(), 1);
        let Def::Problem(problem) = &defs[0] else {
            panic!("expected a problem");
        };
        assert_eq!(problem.name, Name::from("blocks-2"));
        assert_eq!(problem.domain, Name::from("blocks"));
        assert_eq!(problem.objects.len(), 2);
        assert_eq!(problem.init.len(), 4);
        assert_eq!(problem.metric, Metric::MinimizeCost);
    }

    #[test]
    fn both_defs_in_one_file() {
        let input = format!("{BLOCKS_DOMAIN}\n{BLOCKS_PROBLEM}");
        let defs = parse(&input);
        assert_eq!(defs.len(), 2);
        assert!(matches!(defs[0], Def::Domain(_)));
        assert!(matches!(defs[1], Def::Problem(_)));
    }

    #[test]
    fn typed_list_groups() {
        let defs = parse(
            "(define (domain d) (:types t1 t2 - object u - (either t1 t2) loose))",
        );
        let Def::Domain(domain) = &defs[0] else {
            panic!("expected a domain");
        };
        assert_eq!(
            domain.types,
            vec![
                TypedName::new(Name::from("t1"), [Name::from("object")]),
                TypedName::new(Name::from("t2"), [Name::from("object")]),
                TypedName::new(Name::from("u"), [Name::from("t1"), Name::from("t2")]),
                TypedName::new(Name::from("loose"), []),
            ]
        );
    }

    #[test]
    fn quantifiers_and_conditions() {
        let defs = parse(
            "(define (domain d)
               (:action a
                 :parameters ()
                 :precondition (exists (?x ?y - t) (p ?x ?y))
                 :effect (forall (?x - t) (when (p ?x c) (not (q ?x))))))",
        );
        let Def::Domain(domain) = &defs[0] else {
            panic!("expected a domain");
        };
        let action = &domain.actions[0];
        let t = |v| TypedName::new(Name::from(v), [Name::from("t")]);
        assert_eq!(
            action.precondition,
            Formula::exists(
                t("x"),
                Formula::exists(
                    t("y"),
                    Formula::lit(
                        Name::from("p"),
                        true,
                        [
                            Term::Variable(Name::from("x")),
                            Term::Variable(Name::from("y"))
                        ]
                    )
                )
            ),
            "multi-variable quantifier folds to a nest"
        );
        assert_eq!(
            action.effect,
            Formula::forall(
                t("x"),
                Formula::when(
                    Formula::lit(
                        Name::from("p"),
                        true,
                        [
                            Term::Variable(Name::from("x")),
                            Term::Constant(Name::from("c"))
                        ]
                    ),
                    Formula::lit(Name::from("q"), false, [Term::Variable(Name::from("x"))]),
                )
            )
        );
    }

    #[test]
    fn cost_bookkeeping() {
        let defs = parse(
            "(define (domain d)
               (:action a
                 :parameters ()
                 :effect (and (p) (increase (total-cost) 1))))",
        );
        let Def::Domain(domain) = &defs[0] else {
            panic!("expected a domain");
        };
        assert_eq!(
            domain.actions[0].effect,
            Formula::and(
                Formula::lit(Name::from("p"), true, []),
                Formula::Assign(AssignOp::Increase, Name::from("total-cost"), 1),
            )
        );
    }

    #[test]
    fn empty_connectives() {
        let defs = parse(
            "(define (domain d)
               (:action a :parameters () :precondition (and) :effect (p)))",
        );
        let Def::Domain(domain) = &defs[0] else {
            panic!("expected a domain");
        };
        assert_eq!(domain.actions[0].precondition, Formula::True);
    }
}
