//! Predicate inertia: which predicates can any action effect change,
//! and in which direction. Downstream consumers use this to tell
//! static facts from genuine fluents without looking at the operators.

use pavane_syntax::{Domain, Formula};

use crate::InternalError;

/// Effect-direction classification for one predicate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Inertia {
    /// No effect ever touches it; its truth value is fixed by the
    /// initial state.
    Inert,
    /// Only positive effects: it can become true, never false.
    Positive,
    /// Only negative effects: it can become false, never true.
    Negative,
    /// Effects of both signs exist.
    Fluent,
}

/// Classify every predicate by scanning all action effects in the
/// (already numbered) domain. Predicates mentioned only in
/// preconditions, goals, or `when` conditions stay [`Inertia::Inert`].
pub fn find_inertia(domain: &Domain, predicates: usize) -> Result<Vec<Inertia>, InternalError> {
    let mut seen = vec![(false, false); predicates];
    for action in &domain.actions {
        scan(&action.effect, &mut seen)?;
    }
    Ok(seen
        .into_iter()
        .map(|signs| match signs {
            (false, false) => Inertia::Inert,
            (true, false) => Inertia::Positive,
            (false, true) => Inertia::Negative,
            (true, true) => Inertia::Fluent,
        })
        .collect())
}

fn scan(effect: &Formula, seen: &mut [(bool, bool)]) -> Result<(), InternalError> {
    use Formula::*;
    match effect {
        True | False | Assign(..) => Ok(()),
        Literal(l) => {
            let predicate = l
                .predicate
                .id
                .ok_or_else(|| InternalError::Unnumbered(l.predicate.symbol.clone()))?;
            if l.positive {
                seen[predicate].0 = true;
            } else {
                seen[predicate].1 = true;
            }
            Ok(())
        }
        And(l, r) | Or(l, r) => {
            scan(l, seen)?;
            scan(r, seen)
        }
        Not(f) | Forall(_, f) | Exists(_, f) => scan(f, seen),
        // Only the consequent is an effect; the condition is
        // precondition-like and does not count.
        When(_, e) => scan(e, seen),
    }
}
