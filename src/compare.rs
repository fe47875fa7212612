//! Key comparators.
//!
//! A [`Table`](crate::Table) orders its keys with a [`Compare`] implementation chosen as a type parameter. The
//! comparator must describe a strict weak order: two keys comparing [`Ordering::Equal`] are the same key as far as the
//! table is concerned.

use core::cmp::Ordering;

/// A total order over keys of type `K`.
pub trait Compare<K: ?Sized> {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;

    /// `true` when `lhs` is ordered strictly before `rhs`.
    fn less(&self, lhs: &K, rhs: &K) -> bool {
        self.compare(lhs, rhs) == Ordering::Less
    }
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Natural;

impl<K: Ord + ?Sized> Compare<K> for Natural {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

/// Orders keys in descending [`Ord`] order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reverse;

impl<K: Ord + ?Sized> Compare<K> for Reverse {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        rhs.cmp(lhs)
    }
}

impl<K: ?Sized, F> Compare<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        self(lhs, rhs)
    }
}

/// Orders `(key, value)` pairs by key only, using the comparator of the table it was obtained from.
#[derive(Debug, Clone, Copy)]
pub struct ValueCompare<'a, C> {
    pub(crate) comp: &'a C,
}

impl<C> ValueCompare<'_, C> {
    pub fn compare<K, V>(&self, lhs: (&K, &V), rhs: (&K, &V)) -> Ordering
    where
        C: Compare<K>,
    {
        self.comp.compare(lhs.0, rhs.0)
    }

    pub fn less<K, V>(&self, lhs: (&K, &V), rhs: (&K, &V)) -> bool
    where
        C: Compare<K>,
    {
        self.comp.less(lhs.0, rhs.0)
    }
}
