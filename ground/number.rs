//! The numbering pass: walk a domain and problem once, eagerly, and
//! assign a dense id to every type, constant, predicate, and variable
//! occurrence. Constants and objects are folded into the per-type
//! extensions as they are declared. Any reference to something not
//! yet declared is a [`UserError`], reported with its source line.

use pavane_syntax::{Action, Domain, Formula, Literal, Name, Problem, Term, TypedName};

use crate::{SymbolTables, TypeTable, UserError};

/// Scope-local variable bindings: action parameters plus any
/// quantifier variables currently in scope. Slots are per-action and
/// monotone; a popped slot is never reused, so every binder in an
/// action gets a distinct one.
#[derive(Debug, Default)]
struct Frames {
    bindings: Vec<(Name, usize)>,
    next: usize,
}

impl Frames {
    fn push(&mut self, name: Name) -> usize {
        let slot = self.next;
        self.next += 1;
        self.bindings.push((name, slot));
        slot
    }

    fn mark(&self) -> usize {
        self.bindings.len()
    }

    fn pop_to(&mut self, mark: usize) {
        self.bindings.truncate(mark);
    }

    /// Innermost binding wins: search from the back.
    fn lookup(&self, name: &Name) -> Option<usize> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n.symbol == name.symbol)
            .map(|(_, slot)| *slot)
    }
}

/// Number every declaration and reference in a domain.
pub fn number_domain(domain: &mut Domain, tables: &mut SymbolTables) -> Result<(), UserError> {
    for ty in &mut domain.types {
        let id = tables.types.number(&ty.name.symbol);
        ty.name.id = Some(id);
        // Super-types must already be declared; bare declarations get
        // the implicit root.
        let supers = if ty.types.is_empty() {
            if id == TypeTable::OBJECT {
                Vec::new()
            } else {
                vec![TypeTable::OBJECT]
            }
        } else {
            resolve_types(&mut ty.types, tables)?
        };
        tables.types.set_supers(id, supers);
    }
    for constant in &mut domain.constants {
        number_object(constant, tables)?;
    }
    for predicate in &mut domain.predicates {
        predicate.name.id = Some(tables.predicates.number(&predicate.name.symbol));
        for parameter in &mut predicate.parameters {
            resolve_types(&mut parameter.types, tables)?;
        }
    }
    for action in &mut domain.actions {
        number_action(action, tables)?;
    }
    Ok(())
}

/// Number every declaration and reference in a problem. The domain
/// must have been numbered into the same tables first.
pub fn number_problem(problem: &mut Problem, tables: &mut SymbolTables) -> Result<(), UserError> {
    for object in &mut problem.objects {
        number_object(object, tables)?;
    }
    let mut frames = Frames::default();
    for fact in &mut problem.init {
        number_formula(fact, tables, &mut frames)?;
    }
    number_formula(&mut problem.goal, tables, &mut frames)?;
    Ok(())
}

/// Number a constant or object declaration and add it to the
/// extension of each of its declared types (implicitly `object`).
fn number_object(object: &mut TypedName, tables: &mut SymbolTables) -> Result<(), UserError> {
    let id = tables.constants.number(&object.name.symbol);
    object.name.id = Some(id);
    let types = if object.types.is_empty() {
        vec![TypeTable::OBJECT]
    } else {
        resolve_types(&mut object.types, tables)?
    };
    for ty in types {
        tables.types.add_object(ty, id);
    }
    Ok(())
}

/// Resolve a list of type references in place, yielding their ids.
fn resolve_types(types: &mut [Name], tables: &SymbolTables) -> Result<Vec<usize>, UserError> {
    let mut ids = Vec::with_capacity(types.len());
    for ty in types {
        let id = tables
            .types
            .lookup(&ty.symbol)
            .ok_or_else(|| UserError::UndeclaredType {
                name: ty.symbol.clone(),
                line: ty.line,
            })?;
        ty.id = Some(id);
        ids.push(id);
    }
    Ok(ids)
}

fn number_action(action: &mut Action, tables: &SymbolTables) -> Result<(), UserError> {
    let mut frames = Frames::default();
    for parameter in &mut action.parameters {
        resolve_types(&mut parameter.types, tables)?;
        parameter.name.id = Some(frames.push(parameter.name.clone()));
    }
    number_formula(&mut action.precondition, tables, &mut frames)?;
    number_formula(&mut action.effect, tables, &mut frames)?;
    Ok(())
}

fn number_formula(
    formula: &mut Formula,
    tables: &SymbolTables,
    frames: &mut Frames,
) -> Result<(), UserError> {
    use Formula::*;
    match formula {
        True | False | Assign(..) => Ok(()),
        Literal(l) => number_literal(l, tables, frames),
        And(l, r) | Or(l, r) | When(l, r) => {
            number_formula(l, tables, frames)?;
            number_formula(r, tables, frames)
        }
        Not(f) => number_formula(f, tables, frames),
        Forall(var, body) | Exists(var, body) => {
            resolve_types(&mut var.types, tables)?;
            let mark = frames.mark();
            var.name.id = Some(frames.push(var.name.clone()));
            number_formula(body, tables, frames)?;
            frames.pop_to(mark);
            Ok(())
        }
    }
}

fn number_literal(
    literal: &mut Literal,
    tables: &SymbolTables,
    frames: &Frames,
) -> Result<(), UserError> {
    literal.predicate.id = Some(tables.predicates.lookup(&literal.predicate.symbol).ok_or_else(
        || UserError::UndeclaredPredicate {
            name: literal.predicate.symbol.clone(),
            line: literal.predicate.line,
        },
    )?);
    for arg in &mut literal.args {
        match arg {
            Term::Variable(name) => {
                name.id = Some(frames.lookup(name).ok_or_else(|| UserError::UnboundVariable {
                    name: name.symbol.clone(),
                    line: name.line,
                })?);
            }
            Term::Constant(name) => {
                name.id =
                    Some(
                        tables.constants.lookup(&name.symbol).ok_or_else(|| {
                            UserError::UndeclaredConstant {
                                name: name.symbol.clone(),
                                line: name.line,
                            }
                        })?,
                    );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing;

    fn numbered(input: &str) -> (Domain, SymbolTables) {
        let mut domain = testing::domain(input);
        let mut tables = SymbolTables::default();
        number_domain(&mut domain, &mut tables).expect("number");
        (domain, tables)
    }

    #[test]
    fn numbers_vocabulary() {
        let (domain, tables) = numbered(
            "(define (domain logistics)
               (:types vehicle - object truck - vehicle)
               (:constants t1 t2 - truck)
               (:predicates (at ?v - vehicle) (moved ?v - vehicle)))",
        );
        assert_eq!(tables.types.len(), 3, "object is implicit");
        assert_eq!(tables.constants.len(), 2);
        assert_eq!(tables.predicates.len(), 2);
        assert_eq!(domain.types[0].name.id, Some(1));
        assert_eq!(domain.predicates[1].name.id, Some(1));
        // t1, t2 land in truck, vehicle, and object.
        let truck = tables.types.lookup(&"truck".into()).unwrap();
        assert_eq!(tables.types.extension(truck), &[0, 1]);
        assert_eq!(tables.types.extension(TypeTable::OBJECT), &[0, 1]);
    }

    #[test]
    fn parameter_and_quantifier_slots() {
        let (domain, _) = numbered(
            "(define (domain d)
               (:types t)
               (:predicates (p ?x ?y - t) (q ?x - t))
               (:action a
                 :parameters (?x ?y - t)
                 :precondition (forall (?z - t) (p ?x ?z))
                 :effect (q ?y)))",
        );
        let action = &domain.actions[0];
        assert_eq!(action.parameters[0].name.id, Some(0));
        assert_eq!(action.parameters[1].name.id, Some(1));
        let Formula::Forall(z, body) = &action.precondition else {
            panic!("expected forall");
        };
        assert_eq!(z.name.id, Some(2), "slots continue past the parameters");
        let Formula::Literal(p) = &**body else {
            panic!("expected literal");
        };
        let Term::Variable(x) = &p.args[0] else {
            panic!("expected variable");
        };
        let Term::Variable(inner_z) = &p.args[1] else {
            panic!("expected variable");
        };
        assert_eq!(x.id, Some(0));
        assert_eq!(inner_z.id, Some(2));
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let (domain, _) = numbered(
            "(define (domain d)
               (:types t)
               (:predicates (p ?x - t))
               (:action a
                 :parameters (?x - t)
                 :precondition (exists (?x - t) (p ?x))
                 :effect (p ?x)))",
        );
        let action = &domain.actions[0];
        let Formula::Exists(_, body) = &action.precondition else {
            panic!("expected exists");
        };
        let Formula::Literal(p) = &**body else {
            panic!("expected literal");
        };
        let Term::Variable(x) = &p.args[0] else {
            panic!("expected variable");
        };
        assert_eq!(x.id, Some(1), "innermost binder wins");
        let Formula::Literal(q) = &action.effect else {
            panic!("expected literal");
        };
        let Term::Variable(outer) = &q.args[0] else {
            panic!("expected variable");
        };
        assert_eq!(outer.id, Some(0), "quantifier scope has closed");
    }

    #[test]
    fn quantifier_variable_does_not_escape() {
        let mut domain = testing::domain(
            "(define (domain d)
               (:types t)
               (:predicates (p ?x - t))
               (:action a
                 :parameters ()
                 :precondition (and (exists (?x - t) (p ?x)) (p ?x))
                 :effect (p ?x)))",
        );
        let mut tables = SymbolTables::default();
        let err = number_domain(&mut domain, &mut tables).unwrap_err();
        assert!(matches!(
            err,
            UserError::UnboundVariable { ref name, line: 6 } if name.name() == "x"
        ));
    }

    #[test]
    fn undeclared_names_are_user_errors() {
        let undeclared_type = "(define (domain d) (:constants c - missing))";
        let mut tables = SymbolTables::default();
        assert!(matches!(
            number_domain(&mut testing::domain(undeclared_type), &mut tables),
            Err(UserError::UndeclaredType { ref name, line: 1 }) if name.name() == "missing"
        ));

        let undeclared_predicate = "(define (domain d)
               (:action a :parameters () :effect (p)))";
        let mut tables = SymbolTables::default();
        assert!(matches!(
            number_domain(&mut testing::domain(undeclared_predicate), &mut tables),
            Err(UserError::UndeclaredPredicate { ref name, line: 2 }) if name.name() == "p"
        ));

        let undeclared_constant = "(define (domain d)
               (:predicates (p ?x))
               (:action a :parameters () :effect (p c)))";
        let mut tables = SymbolTables::default();
        assert!(matches!(
            number_domain(&mut testing::domain(undeclared_constant), &mut tables),
            Err(UserError::UndeclaredConstant { ref name, line: 3 }) if name.name() == "c"
        ));
    }

    #[test]
    fn numbering_a_problem() {
        let (domain, mut tables) = numbered(
            "(define (domain d)
               (:types t)
               (:predicates (p ?x - t)))",
        );
        drop(domain);
        let mut problem = testing::problem(
            "(define (problem p-1)
               (:domain d)
               (:objects a b - t)
               (:init (p a))
               (:goal (p b)))",
        );
        number_problem(&mut problem, &mut tables).expect("number");
        assert_eq!(tables.constants.len(), 2);
        let t = tables.types.lookup(&"t".into()).unwrap();
        assert_eq!(tables.types.extension(t), &[0, 1]);
        let Formula::Literal(goal) = &problem.goal else {
            panic!("expected literal");
        };
        assert_eq!(goal.predicate.id, Some(0));
        let Term::Constant(b) = &goal.args[0] else {
            panic!("expected constant");
        };
        assert_eq!(b.id, Some(1));
    }
}
