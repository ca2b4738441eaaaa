//! Compile a lifted, typed planning domain into ground operators:
//! number the vocabulary, classify predicate inertia, expand
//! quantifiers and action parameters over the typed objects,
//! normalize to DNF, and extract one operator per precondition
//! disjunct. All tables and interned literals are scoped to a single
//! [`Grounder`] run.

mod dnf;
mod expand;
mod extract;
mod inertia;
mod interner;
mod number;
mod symbols;

use thiserror::Error;

use pavane_syntax::{AssignOp, Domain, Problem, Symbol};
use pavane_tracer::{trace, Trace};

pub use dnf::dnf;
pub use expand::Expander;
pub use extract::Operator;
pub use inertia::{find_inertia, Inertia};
pub use interner::{GroundLiteral, Lit, LiteralInterner};
pub use number::{number_domain, number_problem};
pub use symbols::{SymbolTable, SymbolTables, TypeTable};

/// Bad input: a syntactically valid domain or problem that refers to
/// something it never declared. Reported with the source line of the
/// offending reference.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum UserError {
    #[error("line {line}: undeclared type `{name}`")]
    UndeclaredType { name: Symbol, line: usize },

    #[error("line {line}: undeclared constant `{name}`")]
    UndeclaredConstant { name: Symbol, line: usize },

    #[error("line {line}: undeclared predicate `{name}`")]
    UndeclaredPredicate { name: Symbol, line: usize },

    #[error("line {line}: unbound variable `?{name}`")]
    UnboundVariable { name: Symbol, line: usize },
}

/// A pipeline invariant violation. These indicate a bug in the
/// grounder, not in its input.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum InternalError {
    #[error("name `{0}` was never numbered")]
    Unnumbered(Symbol),

    #[error("no binding for variable slot {0}")]
    UnboundSlot(usize),

    #[error("unexpected {0}")]
    Unexpected(&'static str),
}

/// Anything grounding can fail with.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum GroundError {
    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// A fully ground precondition or effect: quantifier-free by
/// construction, with every literal interned. This is what the
/// normalizer rewrites and the extractor consumes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Matrix {
    True,
    False,
    Lit(Lit),
    And(Box<Matrix>, Box<Matrix>),
    Or(Box<Matrix>, Box<Matrix>),
    Not(Box<Matrix>),
    When(Box<Matrix>, Box<Matrix>),
    Assign(AssignOp, i64),
}

impl Matrix {
    /// Boxing constructor.
    pub fn and(l: Matrix, r: Matrix) -> Self {
        Self::And(Box::new(l), Box::new(r))
    }

    /// Boxing constructor.
    pub fn or(l: Matrix, r: Matrix) -> Self {
        Self::Or(Box::new(l), Box::new(r))
    }

    /// Boxing constructor.
    pub fn not(m: Matrix) -> Self {
        Self::Not(Box::new(m))
    }

    /// Boxing constructor.
    pub fn when(condition: Matrix, effect: Matrix) -> Self {
        Self::When(Box::new(condition), Box::new(effect))
    }
}

/// One grounding run: fresh symbol tables and a fresh literal
/// interner, consumed by [`Grounder::ground`] and handed off in the
/// resulting [`Grounding`].
pub struct Grounder {
    tables: SymbolTables,
    interner: LiteralInterner,
    trace: Trace,
}

impl Grounder {
    pub fn new(trace: Trace) -> Self {
        Self {
            tables: SymbolTables::default(),
            interner: LiteralInterner::new(),
            trace,
        }
    }

    /// Run the whole pipeline: number, classify inertia, expand,
    /// normalize, extract.
    pub fn ground(
        mut self,
        mut domain: Domain,
        mut problem: Option<Problem>,
    ) -> Result<Grounding, GroundError> {
        number_domain(&mut domain, &mut self.tables)?;
        if let Some(problem) = &mut problem {
            number_problem(problem, &mut self.tables)?;
        }
        trace!(
            self.trace,
            Number,
            "numbered {} types, {} constants, {} predicates",
            self.tables.types.len(),
            self.tables.constants.len(),
            self.tables.predicates.len(),
        );

        let inertia = find_inertia(&domain, self.tables.predicates.len())?;
        trace!(
            self.trace,
            Inertia,
            "{} of {} predicates are inert",
            inertia.iter().filter(|i| **i == Inertia::Inert).count(),
            inertia.len(),
        );

        let mut operators = Vec::new();
        let mut init = Vec::new();
        let mut goal = Matrix::True;
        {
            let mut expander = Expander::new(&self.tables, &mut self.interner);
            if let Some(problem) = &problem {
                for fact in &problem.init {
                    if let Matrix::Lit(lit) = expander.formula(fact)? {
                        init.push(lit);
                    }
                }
                goal = expander.formula(&problem.goal)?;
            }
            for action in &domain.actions {
                let ops = expander.action(action)?;
                trace!(
                    self.trace,
                    Expand,
                    "{}: {} operators",
                    action.name,
                    ops.len(),
                );
                operators.extend(ops);
            }
        }
        let goal = dnf(goal, &mut self.interner)?;
        trace!(
            self.trace,
            Extract,
            "{} distinct ground literals, {} operators",
            self.interner.len(),
            operators.len(),
        );

        Ok(Grounding {
            operators,
            init,
            goal,
            inertia,
            tables: self.tables,
            interner: self.interner,
        })
    }
}

/// Ground with tracing disabled.
pub fn ground(domain: Domain, problem: Option<Problem>) -> Result<Grounding, GroundError> {
    Grounder::new(Trace::none()).ground(domain, problem)
}

/// Everything the pipeline produced: the ground operators, the
/// interned initial facts and normalized goal, the per-predicate
/// inertia classification, and the tables needed to print any of it.
#[derive(Debug)]
pub struct Grounding {
    pub operators: Vec<Operator>,
    pub init: Vec<Lit>,
    pub goal: Matrix,
    pub inertia: Vec<Inertia>,
    pub tables: SymbolTables,
    pub interner: LiteralInterner,
}

impl Grounding {
    /// Render an interned literal, e.g., `(not (on a b))`.
    pub fn format_literal(&self, lit: Lit) -> String {
        let l = self.interner.resolve(lit);
        let mut atom = format!("({}", self.tables.predicates.resolve(l.predicate));
        for &arg in &l.args {
            atom.push(' ');
            atom.push_str(self.tables.constants.resolve(arg).name());
        }
        atom.push(')');
        if l.positive {
            atom
        } else {
            format!("(not {atom})")
        }
    }

    fn format_clause(&self, lits: &[Lit]) -> String {
        lits.iter()
            .map(|&l| self.format_literal(l))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render an operator with its precondition and effect lists, one
    /// section per line.
    pub fn format_operator(&self, operator: &Operator) -> String {
        let mut out = format!("({}", operator.name);
        for arg in &operator.args {
            out.push(' ');
            out.push_str(arg.name());
        }
        out.push(')');
        out.push_str(&format!("\n  pre: {}", self.format_clause(&operator.precondition)));
        out.push_str(&format!("\n  eff: {}", self.format_clause(&operator.effects)));
        for (condition, effects) in &operator.when {
            out.push_str(&format!(
                "\n  when {} then {}",
                self.format_clause(condition),
                self.format_clause(effects),
            ));
        }
        out
    }
}
