//! The grounding engine: eliminate quantifiers by enumerating typed
//! object extensions, and enumerate every binding of an action's
//! parameters, normalizing and extracting operators for each.

use std::collections::BTreeSet;

use pavane_syntax::{Action, Formula, Name, Term, TypedName};

use crate::{
    dnf, extract, GroundError, InternalError, Lit, LiteralInterner, Matrix, Operator, SymbolTables,
    TypeTable,
};

/// Grounds formulas and actions against a numbered domain. Bindings
/// map variable slots to object ids; pushed on scope entry, popped on
/// exit, searched innermost-first.
pub struct Expander<'a> {
    tables: &'a SymbolTables,
    interner: &'a mut LiteralInterner,
    bindings: Vec<(usize, usize)>,
}

impl<'a> Expander<'a> {
    pub fn new(tables: &'a SymbolTables, interner: &'a mut LiteralInterner) -> Self {
        Self {
            tables,
            interner,
            bindings: Vec::new(),
        }
    }

    /// Ground one action schema: one candidate per combination of
    /// parameter objects, one operator per precondition disjunct of
    /// each surviving candidate.
    pub fn action(&mut self, action: &Action) -> Result<Vec<Operator>, GroundError> {
        let mut operators = Vec::new();
        self.parameters(action, 0, &mut Vec::new(), &mut operators)?;
        operators.sort();
        operators.dedup();
        Ok(operators)
    }

    fn parameters(
        &mut self,
        action: &Action,
        index: usize,
        bound: &mut Vec<usize>,
        operators: &mut Vec<Operator>,
    ) -> Result<(), GroundError> {
        if index == action.parameters.len() {
            return self.candidate(action, bound, operators);
        }
        let parameter = &action.parameters[index];
        let slot = slot(&parameter.name)?;
        for object in self.extension(parameter)? {
            self.bindings.push((slot, object));
            bound.push(object);
            let result = self.parameters(action, index + 1, bound, operators);
            bound.pop();
            self.bindings.pop();
            result?;
        }
        Ok(())
    }

    /// The objects a typed variable ranges over: the union of its
    /// types' extensions (implicitly `object`), each object exactly
    /// once even when it inhabits several of the listed types.
    fn extension(&self, var: &TypedName) -> Result<Vec<usize>, InternalError> {
        let types = if var.types.is_empty() {
            vec![TypeTable::OBJECT]
        } else {
            var.types
                .iter()
                .map(|t| {
                    t.id.ok_or_else(|| InternalError::Unnumbered(t.symbol.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?
        };
        let mut seen = BTreeSet::new();
        let mut objects = Vec::new();
        for ty in types {
            for &object in self.tables.types.extension(ty) {
                if seen.insert(object) {
                    objects.push(object);
                }
            }
        }
        Ok(objects)
    }

    /// Ground, normalize, and extract one fully bound candidate.
    /// Candidates whose precondition grounds to `False`, or whose
    /// effect does nothing, produce no operators.
    fn candidate(
        &mut self,
        action: &Action,
        bound: &[usize],
        operators: &mut Vec<Operator>,
    ) -> Result<(), GroundError> {
        let precondition = self.formula(&action.precondition)?;
        if precondition == Matrix::False {
            return Ok(());
        }
        let effect = self.formula(&action.effect)?;
        let precondition = dnf(precondition, self.interner)?;
        let effect = dnf(effect, self.interner)?;
        let args = bound
            .iter()
            .map(|&object| self.tables.constants.resolve(object).clone())
            .collect();
        operators.extend(extract::operators(action, args, &precondition, &effect)?);
        Ok(())
    }

    /// Replace quantifiers with explicit connectives over object
    /// extensions, folding `True` and `False` away as they appear,
    /// and intern every literal on sight (all variables in scope are
    /// bound by now, so every literal is fully ground).
    pub fn formula(&mut self, formula: &Formula) -> Result<Matrix, GroundError> {
        use Formula::*;
        Ok(match formula {
            True => Matrix::True,
            False => Matrix::False,
            Assign(op, _, amount) => Matrix::Assign(*op, *amount),
            Literal(l) => Matrix::Lit(self.literal(l)?),
            And(l, r) => match self.formula(l)? {
                Matrix::False => Matrix::False,
                Matrix::True => self.formula(r)?,
                l => match self.formula(r)? {
                    Matrix::False => Matrix::False,
                    Matrix::True => l,
                    r => Matrix::and(l, r),
                },
            },
            Or(l, r) => match self.formula(l)? {
                Matrix::True => Matrix::True,
                Matrix::False => self.formula(r)?,
                l => match self.formula(r)? {
                    Matrix::True => Matrix::True,
                    Matrix::False => l,
                    r => Matrix::or(l, r),
                },
            },
            Not(f) => match self.formula(f)? {
                Matrix::True => Matrix::False,
                Matrix::False => Matrix::True,
                Matrix::Lit(l) => Matrix::Lit(self.interner.negate(l)),
                m => Matrix::not(m),
            },
            Forall(var, body) => self.quantifier(var, body, true)?,
            Exists(var, body) => self.quantifier(var, body, false)?,
            When(condition, effect) => {
                let condition = self.formula(condition)?;
                let effect = self.formula(effect)?;
                match condition {
                    // A condition that can never hold makes the whole
                    // conditional effect vacuous.
                    Matrix::False => Matrix::True,
                    Matrix::True => effect,
                    condition => Matrix::when(condition, effect),
                }
            }
        })
    }

    /// `forall` becomes a conjunction over the variable's extension,
    /// `exists` a disjunction. An empty extension yields the
    /// connective's identity: `True` for `forall`, `False` for
    /// `exists`.
    fn quantifier(
        &mut self,
        var: &TypedName,
        body: &Formula,
        universal: bool,
    ) -> Result<Matrix, GroundError> {
        let slot = slot(&var.name)?;
        let mut instances = Vec::new();
        for object in self.extension(var)? {
            self.bindings.push((slot, object));
            let instance = self.formula(body);
            self.bindings.pop();
            match instance? {
                Matrix::True if universal => continue,
                Matrix::False if !universal => continue,
                Matrix::False => return Ok(Matrix::False),
                Matrix::True => return Ok(Matrix::True),
                instance => instances.push(instance),
            }
        }
        Ok(instances
            .into_iter()
            .rev()
            .reduce(|r, l| {
                if universal {
                    Matrix::and(l, r)
                } else {
                    Matrix::or(l, r)
                }
            })
            .unwrap_or(if universal { Matrix::True } else { Matrix::False }))
    }

    fn literal(&mut self, literal: &pavane_syntax::Literal) -> Result<Lit, GroundError> {
        let predicate = slot(&literal.predicate)?;
        let mut args = Vec::with_capacity(literal.args.len());
        for term in &literal.args {
            args.push(match term {
                Term::Constant(name) => slot(name)?,
                Term::Variable(name) => {
                    let slot = slot(name)?;
                    self.bindings
                        .iter()
                        .rev()
                        .find(|(s, _)| *s == slot)
                        .map(|(_, object)| *object)
                        .ok_or(InternalError::UnboundSlot(slot))?
                }
            });
        }
        Ok(self.interner.intern(predicate, literal.positive, &args))
    }
}

/// A numbered name's id. Missing ids mean the numbering pass never
/// saw this tree.
fn slot(name: &Name) -> Result<usize, InternalError> {
    name.id
        .ok_or_else(|| InternalError::Unnumbered(name.symbol.clone()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{number_domain, testing};

    /// Number a domain and ground its sole action's precondition with
    /// no parameter bindings.
    fn ground_precondition(input: &str) -> (Matrix, LiteralInterner) {
        let mut domain = testing::domain(input);
        let mut tables = SymbolTables::default();
        number_domain(&mut domain, &mut tables).expect("number");
        let mut interner = LiteralInterner::new();
        let matrix = Expander::new(&tables, &mut interner)
            .formula(&domain.actions[0].precondition)
            .expect("ground");
        (matrix, interner)
    }

    #[test]
    fn forall_becomes_a_conjunction() {
        let (matrix, interner) = ground_precondition(
            "(define (domain d)
               (:types t)
               (:constants a b c - t)
               (:predicates (p ?x - t))
               (:action act
                 :parameters ()
                 :precondition (forall (?x - t) (p ?x))
                 :effect (p a)))",
        );
        // One conjunct per object of t, one interned literal each.
        assert_eq!(interner.len(), 3);
        let p = |i: usize| Matrix::Lit(Lit::from_id(i));
        assert_eq!(matrix, Matrix::and(p(0), Matrix::and(p(1), p(2))));
    }

    #[test]
    fn exists_becomes_a_disjunction() {
        let (matrix, interner) = ground_precondition(
            "(define (domain d)
               (:types t)
               (:constants a b - t)
               (:predicates (p ?x - t))
               (:action act
                 :parameters ()
                 :precondition (exists (?x - t) (p ?x))
                 :effect (p a)))",
        );
        assert_eq!(interner.len(), 2);
        assert_eq!(
            matrix,
            Matrix::or(Matrix::Lit(Lit::from_id(0)), Matrix::Lit(Lit::from_id(1)))
        );
    }

    #[test]
    fn either_union_counts_shared_objects_once() {
        let (matrix, interner) = ground_precondition(
            "(define (domain d)
               (:types t1 - object t2 - object u - (either t1 t2))
               (:constants a - t1 b - t2 both - u)
               (:predicates (p ?x))
               (:action act
                 :parameters ()
                 :precondition (forall (?x - (either t1 t2)) (p ?x))
                 :effect (p a)))",
        );
        // `both` inhabits t1 and t2 but appears exactly once.
        assert_eq!(interner.len(), 3);
        assert!(matches!(matrix, Matrix::And(..)));
    }

    #[test]
    fn empty_extension_folds_to_identity() {
        let input = |quantifier: &str| {
            format!(
                "(define (domain d)
                   (:types t)
                   (:constants a - object)
                   (:predicates (p ?x) (q ?x))
                   (:action act
                     :parameters ()
                     :precondition ({quantifier} (?x - t) (p ?x))
                     :effect (q a)))"
            )
        };
        let (matrix, _) = ground_precondition(&input("forall"));
        assert_eq!(matrix, Matrix::True, "vacuous forall");
        let (matrix, _) = ground_precondition(&input("exists"));
        assert_eq!(matrix, Matrix::False, "vacuous exists");
    }

    #[test]
    fn connectives_short_circuit() {
        let (matrix, interner) = ground_precondition(
            "(define (domain d)
               (:types t)
               (:constants a b - t)
               (:predicates (p ?x - t))
               (:action act
                 :parameters ()
                 :precondition (and (p a) (or (and) (p b)))
                 :effect (p a)))",
        );
        // The empty (and) is True, so the disjunction short-circuits
        // before reaching (p b), and True folds out of the conjunction.
        assert_eq!(matrix, Matrix::Lit(Lit::from_id(0)));
        assert_eq!(interner.len(), 1, "(p b) was never interned");
    }

    #[test]
    fn parameter_expansion_counts_bindings() {
        let mut domain = testing::domain(
            "(define (domain d)
               (:types t)
               (:constants a b c - t)
               (:predicates (p ?x - t) (q ?x ?y - t))
               (:action act
                 :parameters (?x ?y - t)
                 :precondition (p ?x)
                 :effect (q ?x ?y)))",
        );
        let mut tables = SymbolTables::default();
        number_domain(&mut domain, &mut tables).expect("number");
        let mut interner = LiteralInterner::new();
        let operators = Expander::new(&tables, &mut interner)
            .action(&domain.actions[0])
            .expect("ground");
        assert_eq!(operators.len(), 9, "3 objects ** 2 parameters");
    }

    #[test]
    fn impossible_and_vacuous_candidates_drop() {
        let mut domain = testing::domain(
            "(define (domain d)
               (:types t)
               (:constants a b - t)
               (:predicates (p ?x - t))
               (:action act
                 :parameters (?x - t)
                 :precondition (and (p ?x) (or))
                 :effect (not (p ?x)))
               (:action noop
                 :parameters (?x - t)
                 :precondition (p ?x)
                 :effect (and)))",
        );
        let mut tables = SymbolTables::default();
        number_domain(&mut domain, &mut tables).expect("number");
        let mut interner = LiteralInterner::new();
        let mut expander = Expander::new(&tables, &mut interner);
        let impossible = expander.action(&domain.actions[0]).expect("ground");
        assert!(impossible.is_empty(), "False precondition");
        let noop = expander.action(&domain.actions[1]).expect("ground");
        assert!(noop.is_empty(), "empty effect");
    }
}
