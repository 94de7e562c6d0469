//! Lazy transform chains.
//!
//! A chain is an ordered, append-only list of unary functions applied to a
//! value at read time. Containers keep two chains each (data and target) and
//! apply them parent-first as resolution walks back down the view stack.

use std::fmt;

/// An ordered list of `V -> V` functions applied lazily at read time.
pub(crate) struct TransformChain<V> {
    funcs: Vec<Box<dyn Fn(V) -> V + Send + Sync>>,
}

impl<V> TransformChain<V> {
    pub(crate) fn new() -> Self {
        Self { funcs: Vec::new() }
    }

    /// Append a function to the end of the chain.
    pub(crate) fn push(&mut self, function: impl Fn(V) -> V + Send + Sync + 'static) {
        self.funcs.push(Box::new(function));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Run the value through every function in insertion order.
    pub(crate) fn apply(&self, value: V) -> V {
        self.funcs.iter().fold(value, |value, f| f(value))
    }
}

impl<V> fmt::Debug for TransformChain<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformChain")
            .field("len", &self.funcs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_in_insertion_order() {
        let mut chain = TransformChain::new();
        chain.push(|x: i64| x + 1);
        chain.push(|x: i64| x * 10);
        // g(f(x)), not f(g(x))
        assert_eq!(chain.apply(4), 50);
    }

    #[test]
    fn empty_chain_is_identity() {
        let chain = TransformChain::<i64>::new();
        assert!(chain.is_empty());
        assert_eq!(chain.apply(42), 42);
    }
}
