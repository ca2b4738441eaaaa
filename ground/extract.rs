//! Flatten grounded, normalized actions into operator records, the
//! pipeline's terminal artifact.

use pavane_syntax::{Action, Symbol};

use crate::{InternalError, Lit, Matrix};

/// A fully instantiated action, ready for a planner's state-transition
/// function: conjunctive precondition, unconditional effects, and
/// (condition, effects) pairs for the conditional ones. Every literal
/// is an interner handle.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Operator {
    pub name: Symbol,
    pub args: Vec<Symbol>,
    pub cost: u64,
    pub precondition: Vec<Lit>,
    pub effects: Vec<Lit>,
    pub when: Vec<(Vec<Lit>, Vec<Lit>)>,
}

/// Extract operators from one normalized candidate: one operator per
/// precondition disjunct, all sharing the candidate's effect lists.
/// A candidate whose effect does nothing yields no operators; so does
/// a disjunct that grounds to `False`.
pub fn operators(
    action: &Action,
    args: Vec<Symbol>,
    precondition: &Matrix,
    effect: &Matrix,
) -> Result<Vec<Operator>, InternalError> {
    let (effects, when) = split_effect(effect)?;
    if effects.is_empty() && when.is_empty() {
        return Ok(Vec::new());
    }
    let mut operators = Vec::new();
    for disjunct in disjuncts(precondition) {
        let Some(precondition) = clause(disjunct)? else {
            continue;
        };
        operators.push(Operator {
            name: action.name.symbol.clone(),
            args: args.clone(),
            cost: 1,
            precondition,
            effects: effects.clone(),
            when: when.clone(),
        });
    }
    Ok(operators)
}

/// The top-level disjuncts of a normalized formula; a non-`Or` is its
/// own sole disjunct.
fn disjuncts(m: &Matrix) -> Vec<&Matrix> {
    match m {
        Matrix::Or(l, r) => {
            let mut ds = disjuncts(l);
            ds.extend(disjuncts(r));
            ds
        }
        m => vec![m],
    }
}

/// Flatten a conjunctive clause into a sorted, deduplicated literal
/// list. `True` contributes nothing; a `False` clause drops entirely.
fn clause(m: &Matrix) -> Result<Option<Vec<Lit>>, InternalError> {
    let mut lits = Vec::new();
    if !conjuncts(m, &mut lits)? {
        return Ok(None);
    }
    lits.sort();
    lits.dedup();
    Ok(Some(lits))
}

fn conjuncts(m: &Matrix, lits: &mut Vec<Lit>) -> Result<bool, InternalError> {
    match m {
        Matrix::True => Ok(true),
        Matrix::False => Ok(false),
        Matrix::Lit(l) => {
            lits.push(*l);
            Ok(true)
        }
        Matrix::And(l, r) => Ok(conjuncts(l, lits)? && conjuncts(r, lits)?),
        // Cost bookkeeping carries no logical content.
        Matrix::Assign(..) => Ok(true),
        Matrix::Or(..) => Err(InternalError::Unexpected("disjunction in a clause")),
        Matrix::Not(..) => Err(InternalError::Unexpected("negation in a clause")),
        Matrix::When(..) => Err(InternalError::Unexpected("conditional in a clause")),
    }
}

/// Split a normalized effect into its unconditional literals and its
/// conditional (condition clause, effect clause) pairs.
fn split_effect(m: &Matrix) -> Result<(Vec<Lit>, Vec<(Vec<Lit>, Vec<Lit>)>), InternalError> {
    let mut effects = Vec::new();
    let mut when = Vec::new();
    walk_effect(m, &mut effects, &mut when)?;
    effects.sort();
    effects.dedup();
    Ok((effects, when))
}

fn walk_effect(
    m: &Matrix,
    effects: &mut Vec<Lit>,
    when: &mut Vec<(Vec<Lit>, Vec<Lit>)>,
) -> Result<(), InternalError> {
    match m {
        Matrix::True | Matrix::Assign(..) => Ok(()),
        Matrix::Lit(l) => {
            effects.push(*l);
            Ok(())
        }
        Matrix::And(l, r) => {
            walk_effect(l, effects, when)?;
            walk_effect(r, effects, when)
        }
        Matrix::When(condition, effect) => {
            // A contradictory condition was folded away upstream, but
            // tolerate one here: the pair can simply never fire.
            if let Some(condition) = clause(condition)? {
                let effect =
                    clause(effect)?.ok_or(InternalError::Unexpected("contradictory effect"))?;
                when.push((condition, effect));
            }
            Ok(())
        }
        Matrix::False => Err(InternalError::Unexpected("contradictory effect")),
        Matrix::Or(..) => Err(InternalError::Unexpected("disjunctive effect")),
        Matrix::Not(..) => Err(InternalError::Unexpected("negated effect")),
    }
}
