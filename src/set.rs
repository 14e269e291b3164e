use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    #[cfg(feature = "llrb")]
    pub(crate) fn toggled(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

/// An ordered set of distinct keys with `O(log n)` insertion.
pub trait OrderedSet<K> {
    type Iter<'a>: Iterator<Item = &'a K>
    where
        Self: 'a,
        K: 'a;

    /// Returns `Ok(false)` without touching the tree if `key` is already present.
    fn insert(&mut self, key: K) -> Result<bool, Error>;

    fn contains(&self, key: &K) -> bool;

    /// Keys in ascending order.
    fn iter(&self) -> Self::Iter<'_>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
