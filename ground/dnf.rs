//! Rewrite ground formulas into disjunctive normal form: a
//! disjunction of conjunctive clauses with every negation pushed into
//! a literal's sign. Conditional effects come out with single-clause
//! conditions.

use crate::{InternalError, LiteralInterner, Matrix};

/// Normalize a ground formula. The result contains `Or` only above
/// `And`, `And` only above literals and `when`s, and no `Not` at all;
/// re-normalizing is the identity.
pub fn dnf(m: Matrix, interner: &mut LiteralInterner) -> Result<Matrix, InternalError> {
    use Matrix::*;
    Ok(match m {
        True | False | Lit(_) | Assign(..) => m,
        And(l, r) => {
            let l = dnf(*l, interner)?;
            let r = dnf(*r, interner)?;
            distribute(l, r, interner)?
        }
        Or(l, r) => Matrix::or(dnf(*l, interner)?, dnf(*r, interner)?),
        Not(f) => negate(dnf(*f, interner)?, interner)?,
        When(c, e) => {
            let c = dnf(*c, interner)?;
            let e = dnf(*e, interner)?;
            split_when(c, e)
        }
    })
}

/// `(a ∨ b) ∧ c ⇒ (a ∧ c) ∨ (b ∧ c)`, renormalizing each branch.
fn distribute(l: Matrix, r: Matrix, interner: &mut LiteralInterner) -> Result<Matrix, InternalError> {
    use Matrix::*;
    match (l, r) {
        (Or(a, b), c) => Ok(Matrix::or(
            dnf(Matrix::and(*a, c.clone()), interner)?,
            dnf(Matrix::and(*b, c), interner)?,
        )),
        (c, Or(a, b)) => Ok(Matrix::or(
            dnf(Matrix::and(c.clone(), *a), interner)?,
            dnf(Matrix::and(c, *b), interner)?,
        )),
        (l, r) => Ok(And(Box::new(l), Box::new(r))),
    }
}

/// Negate an already-normal formula: flip literal signs through the
/// interner, apply De Morgan to the connectives, and collapse double
/// negations.
fn negate(m: Matrix, interner: &mut LiteralInterner) -> Result<Matrix, InternalError> {
    use Matrix::*;
    Ok(match m {
        True => False,
        False => True,
        Lit(l) => Lit(interner.negate(l)),
        And(a, b) => dnf(Matrix::or(Matrix::not(*a), Matrix::not(*b)), interner)?,
        Or(a, b) => dnf(Matrix::and(Matrix::not(*a), Matrix::not(*b)), interner)?,
        Not(f) => *f,
        When(..) | Assign(..) => return Err(InternalError::Unexpected("negated effect")),
    })
}

/// A conditional effect whose condition is a disjunction splits into
/// one `when` per disjunct. The split `when`s are conjoined; firing
/// under `a ∨ b` is firing under `a` and firing under `b`.
fn split_when(condition: Matrix, effect: Matrix) -> Matrix {
    match condition {
        Matrix::Or(a, b) => Matrix::and(split_when(*a, effect.clone()), split_when(*b, effect)),
        c => Matrix::when(c, effect),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lits(interner: &mut LiteralInterner, n: usize) -> Vec<Matrix> {
        (0..n)
            .map(|p| Matrix::Lit(interner.intern(p, true, &[])))
            .collect()
    }

    #[test]
    fn distributes_and_over_or() {
        let mut interner = LiteralInterner::new();
        let ls = lits(&mut interner, 3);
        let (p, q, r) = (ls[0].clone(), ls[1].clone(), ls[2].clone());
        // p ∧ (q ∨ r) ⇒ (p ∧ q) ∨ (p ∧ r)
        let m = Matrix::and(p.clone(), Matrix::or(q.clone(), r.clone()));
        assert_eq!(
            dnf(m, &mut interner).unwrap(),
            Matrix::or(
                Matrix::and(p.clone(), q),
                Matrix::and(p, r),
            )
        );
    }

    #[test]
    fn de_morgan() {
        let mut interner = LiteralInterner::new();
        let p = interner.intern(0, true, &[]);
        let q = interner.intern(1, true, &[]);
        let np = interner.intern(0, false, &[]);
        let nq = interner.intern(1, false, &[]);
        // ¬(p ∧ q) ⇒ ¬p ∨ ¬q
        let m = Matrix::not(Matrix::and(Matrix::Lit(p), Matrix::Lit(q)));
        assert_eq!(
            dnf(m, &mut interner).unwrap(),
            Matrix::or(Matrix::Lit(np), Matrix::Lit(nq))
        );
        // ¬(p ∨ q) ⇒ ¬p ∧ ¬q
        let m = Matrix::not(Matrix::or(Matrix::Lit(p), Matrix::Lit(q)));
        assert_eq!(
            dnf(m, &mut interner).unwrap(),
            Matrix::and(Matrix::Lit(np), Matrix::Lit(nq))
        );
    }

    #[test]
    fn double_negation() {
        let mut interner = LiteralInterner::new();
        let p = interner.intern(0, true, &[]);
        let m = Matrix::not(Matrix::not(Matrix::Lit(p)));
        assert_eq!(dnf(m, &mut interner).unwrap(), Matrix::Lit(p));
        assert_eq!(interner.len(), 1, "no negated twin was interned");
    }

    #[test]
    fn when_condition_splits_per_disjunct() {
        let mut interner = LiteralInterner::new();
        let ls = lits(&mut interner, 3);
        let (p, q, e) = (ls[0].clone(), ls[1].clone(), ls[2].clone());
        let m = Matrix::when(Matrix::or(p.clone(), q.clone()), e.clone());
        assert_eq!(
            dnf(m, &mut interner).unwrap(),
            Matrix::and(
                Matrix::when(p, e.clone()),
                Matrix::when(q, e),
            )
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let mut interner = LiteralInterner::new();
        let ls = lits(&mut interner, 4);
        let m = Matrix::and(
            Matrix::or(ls[0].clone(), ls[1].clone()),
            Matrix::not(Matrix::and(ls[2].clone(), ls[3].clone())),
        );
        let once = dnf(m, &mut interner).unwrap();
        let twice = dnf(once.clone(), &mut interner).unwrap();
        assert_eq!(once, twice);
    }
}
