//! Hash-consing of ground literals. Every structurally distinct
//! literal is stored exactly once and handled by id thereafter, so
//! equality anywhere downstream is an integer comparison.

/// Canonical handle to an interned ground literal. Two handles are
/// equal iff the literals they denote are structurally equal.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Lit(usize);

impl Lit {
    pub fn id(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_id(id: usize) -> Self {
        Lit(id)
    }
}

/// A fully ground literal: predicate id, sign, and constant ids for
/// every argument.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroundLiteral {
    pub id: usize,
    pub predicate: usize,
    pub positive: bool,
    pub args: Vec<usize>,
}

const BUCKETS: usize = 1 << 12;

/// The literal store. Hashing is universal over the literal's parts:
/// each (argument position, id) pair lazily draws a 64-bit code, with
/// position 0 reserved for the predicate and one dedicated code for
/// negative sign, and a literal's hash is the XOR of its parts' codes.
#[derive(Debug)]
pub struct LiteralInterner {
    codes: Vec<Vec<u64>>,
    sign: u64,
    state: u64,
    buckets: Vec<Vec<Lit>>,
    literals: Vec<GroundLiteral>,
}

impl LiteralInterner {
    pub fn new() -> Self {
        let mut interner = Self {
            codes: Vec::new(),
            sign: 0,
            state: 0x853c_49e6_748f_ea9b,
            buckets: vec![Vec::new(); BUCKETS],
            literals: Vec::new(),
        };
        interner.sign = interner.draw();
        interner
    }

    /// splitmix64. The codes only spread literals across buckets;
    /// equality is always decided structurally.
    fn draw(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn code(&mut self, position: usize, id: usize) -> u64 {
        while self.codes.len() <= position {
            self.codes.push(Vec::new());
        }
        while self.codes[position].len() <= id {
            let code = self.draw();
            self.codes[position].push(code);
        }
        self.codes[position][id]
    }

    fn hash(&mut self, predicate: usize, positive: bool, args: &[usize]) -> u64 {
        let mut h = self.code(0, predicate);
        if !positive {
            h ^= self.sign;
        }
        for (i, &arg) in args.iter().enumerate() {
            h ^= self.code(i + 1, arg);
        }
        h
    }

    /// Get or create the canonical handle for a literal.
    pub fn intern(&mut self, predicate: usize, positive: bool, args: &[usize]) -> Lit {
        let hash = self.hash(predicate, positive, args);
        let bucket = (hash as usize) & (BUCKETS - 1);
        for &lit in &self.buckets[bucket] {
            let l = &self.literals[lit.0];
            if l.predicate == predicate && l.positive == positive && l.args == args {
                return lit;
            }
        }
        let lit = Lit(self.literals.len());
        self.literals.push(GroundLiteral {
            id: lit.0,
            predicate,
            positive,
            args: args.to_vec(),
        });
        self.buckets[bucket].push(lit);
        lit
    }

    /// The canonical handle for a literal's opposite-sign twin.
    pub fn negate(&mut self, lit: Lit) -> Lit {
        let l = self.resolve(lit);
        let (predicate, positive, args) = (l.predicate, l.positive, l.args.clone());
        self.intern(predicate, !positive, &args)
    }

    /// Only defined for handles this interner issued.
    pub fn resolve(&self, lit: Lit) -> &GroundLiteral {
        &self.literals[lit.0]
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

impl Default for LiteralInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn interning_identity() {
        let mut interner = LiteralInterner::new();
        let a = interner.intern(0, true, &[1, 2]);
        let b = interner.intern(0, true, &[1, 2]);
        assert_eq!(a, b, "structurally equal literals share one handle");
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn distinct_literals_get_distinct_handles() {
        let mut interner = LiteralInterner::new();
        let a = interner.intern(0, true, &[1, 2]);
        assert_ne!(interner.intern(0, true, &[2, 1]), a, "argument order");
        assert_ne!(interner.intern(0, false, &[1, 2]), a, "sign");
        assert_ne!(interner.intern(1, true, &[1, 2]), a, "predicate");
        assert_ne!(interner.intern(0, true, &[1]), a, "arity");
        assert_eq!(interner.len(), 5);
    }

    #[test]
    fn sequential_ids() {
        let mut interner = LiteralInterner::new();
        for i in 0..10 {
            let lit = interner.intern(i, true, &[]);
            assert_eq!(lit.id(), i);
            assert_eq!(interner.resolve(lit).id, i);
        }
    }

    #[test]
    fn negation_round_trip() {
        let mut interner = LiteralInterner::new();
        let pos = interner.intern(3, true, &[0]);
        let neg = interner.negate(pos);
        assert_ne!(pos, neg);
        assert!(!interner.resolve(neg).positive);
        assert_eq!(interner.negate(neg), pos, "negating twice is identity");
        assert_eq!(interner.len(), 2);
    }
}
