use std::fmt;
use std::sync::Arc;

/// Ordered sequence of symbol names shared by both operands of a
/// multiplication. Cheaply clonable so every worker closure can hold its own
/// handle without copying the backing storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolSet(Arc<[String]>);

impl SymbolSet {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let v: Vec<String> = symbols.into_iter().map(Into::into).collect();
        Self(v.into())
    }

    #[inline]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Capability required of a coefficient type: in-place accumulation, and
/// negation used during trigonometric sign canonicalisation.
pub trait Coeff: Clone + Send + Sync {
    fn add_assign(&mut self, other: Self);
    fn neg_assign(&mut self);
}

/// Capability required of a monomial key type. `MULTIPLY_ARITY` is 1 for
/// ordinary polynomial monomials and 2 for trigonometric monomials, whose
/// product expands into a cosine/sine sum-and-difference pair.
pub trait Key: Clone + Send + Sync + Sized + 'static {
    type Coeff: Coeff;

    const MULTIPLY_ARITY: usize;

    /// Multiplies two terms, pushing `MULTIPLY_ARITY` product terms onto
    /// `out`. Callers clear `out` before calling; implementations only
    /// ever push, never read, its prior contents.
    fn multiply(out: &mut Vec<Term<Self>>, a: &Term<Self>, b: &Term<Self>, symbols: &SymbolSet);

    fn hash(&self) -> u64;
    fn key_eq(&self, other: &Self) -> bool;
    fn is_compatible(&self, symbols: &SymbolSet) -> bool;
    fn is_ignorable(&self, symbols: &SymbolSet) -> bool;
}

/// A `(coefficient, key)` pair. Keys are unique within a [`crate::Series`];
/// coefficients accumulate when two terms share a key.
#[derive(Clone)]
pub struct Term<K: Key> {
    pub cf: K::Coeff,
    pub key: K,
}

impl<K: Key> Term<K> {
    pub fn new(cf: K::Coeff, key: K) -> Self {
        Self { cf, key }
    }
}

impl<K: Key> fmt::Debug for Term<K>
where
    K: fmt::Debug,
    K::Coeff: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Term").field("cf", &self.cf).field("key", &self.key).finish()
    }
}
