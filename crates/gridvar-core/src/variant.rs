//! Working-variant selection, per manager instance.
//!
//! A [`VariantContext`] records which variant array index reads and writes
//! currently target. It comes in two flavors: a single shared index for
//! single-threaded use, and a per-thread map so worker threads can each pin
//! a different variant of the same network. The map is keyed by
//! [`ThreadId`], scoped to the owning manager rather than process-global, so
//! two managers in one process never see each other's selections.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use crate::error::{GvError, GvResult};

#[derive(Debug)]
pub(crate) enum VariantContext {
    /// One shared index, `None` until a variant is selected.
    Multiple(Option<usize>),
    /// One independent index per thread; a thread with no entry has no
    /// working variant selected.
    ThreadLocal(HashMap<ThreadId, usize>),
}

impl VariantContext {
    /// Index of the calling thread's working variant.
    pub(crate) fn variant_index(&self) -> GvResult<usize> {
        match self {
            VariantContext::Multiple(index) => index.ok_or(GvError::VariantIndexNotSet),
            VariantContext::ThreadLocal(indexes) => indexes
                .get(&thread::current().id())
                .copied()
                .ok_or(GvError::VariantIndexNotSet),
        }
    }

    pub(crate) fn is_index_set(&self) -> bool {
        match self {
            VariantContext::Multiple(index) => index.is_some(),
            VariantContext::ThreadLocal(indexes) => indexes.contains_key(&thread::current().id()),
        }
    }

    pub(crate) fn set_variant_index(&mut self, index: usize) {
        match self {
            VariantContext::Multiple(current) => *current = Some(index),
            VariantContext::ThreadLocal(indexes) => {
                indexes.insert(thread::current().id(), index);
            }
        }
    }

    /// Clears the selection.
    ///
    /// In thread-local mode only the calling thread's entry is dropped;
    /// other threads keep whatever they had selected.
    pub(crate) fn reset(&mut self) {
        match self {
            VariantContext::Multiple(current) => *current = None,
            VariantContext::ThreadLocal(indexes) => {
                indexes.remove(&thread::current().id());
            }
        }
    }

    /// Clears the selection iff it currently targets `index`.
    ///
    /// Called when a variant is removed so a dangling selection cannot read
    /// a recycled slot. In thread-local mode this inspects the calling
    /// thread's entry only.
    pub(crate) fn reset_if_variant_index_is(&mut self, index: usize) {
        match self {
            VariantContext::Multiple(current) => {
                if *current == Some(index) {
                    *current = None;
                }
            }
            VariantContext::ThreadLocal(indexes) => {
                let id = thread::current().id();
                if indexes.get(&id) == Some(&index) {
                    indexes.remove(&id);
                }
            }
        }
    }

    pub(crate) fn is_multi_thread(&self) -> bool {
        matches!(self, VariantContext::ThreadLocal(_))
    }
}

/// Saves the current selection on creation and restores it on drop, so a
/// scoped switch to another variant cannot leak past its block even on an
/// early return.
pub(crate) struct VariantContextGuard<'a> {
    context: &'a mut VariantContext,
    saved: Option<usize>,
}

impl<'a> VariantContextGuard<'a> {
    pub(crate) fn new(context: &'a mut VariantContext) -> Self {
        let saved = context.variant_index().ok();
        Self { context, saved }
    }

    pub(crate) fn context_mut(&mut self) -> &mut VariantContext {
        self.context
    }
}

impl Drop for VariantContextGuard<'_> {
    fn drop(&mut self) {
        match self.saved {
            Some(index) => self.context.set_variant_index(index),
            None => self.context.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_context_starts_unset() {
        let context = VariantContext::Multiple(None);
        assert!(!context.is_index_set());
        assert_eq!(context.variant_index(), Err(GvError::VariantIndexNotSet));
    }

    #[test]
    fn multiple_context_set_and_reset() {
        let mut context = VariantContext::Multiple(None);
        context.set_variant_index(2);
        assert_eq!(context.variant_index(), Ok(2));

        context.reset_if_variant_index_is(1);
        assert_eq!(context.variant_index(), Ok(2));
        context.reset_if_variant_index_is(2);
        assert!(!context.is_index_set());
    }

    #[test]
    fn thread_local_entries_are_independent() {
        let mut context = VariantContext::ThreadLocal(HashMap::new());
        assert!(context.is_multi_thread());
        assert!(!context.is_index_set());

        context.set_variant_index(3);
        assert_eq!(context.variant_index(), Ok(3));

        // Another thread sees no selection of its own.
        std::thread::scope(|s| {
            s.spawn(|| {
                assert_eq!(context.variant_index(), Err(GvError::VariantIndexNotSet));
            });
        });
    }

    #[test]
    fn guard_restores_previous_selection() {
        let mut context = VariantContext::Multiple(Some(1));
        {
            let mut guard = VariantContextGuard::new(&mut context);
            guard.context_mut().set_variant_index(4);
            assert_eq!(guard.context_mut().variant_index(), Ok(4));
        }
        assert_eq!(context.variant_index(), Ok(1));
    }

    #[test]
    fn guard_restores_unset_selection() {
        let mut context = VariantContext::Multiple(None);
        {
            let mut guard = VariantContextGuard::new(&mut context);
            guard.context_mut().set_variant_index(4);
        }
        assert!(!context.is_index_set());
    }
}
