//! Per-variant state storage for network objects.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{GvError, GvResult};

/// Implemented by every object carrying per-variant state.
///
/// The variant manager fans these callbacks out whenever the variant array
/// geometry changes; implementors resize or copy their own storage in
/// lockstep. Indices are trusted: the manager only ever passes indices it
/// has itself allocated.
pub trait MultiVariantObject {
    /// Copies the state at `source_index` into each of `indexes`, which all
    /// lie within the current array size (recycled or overwritten slots).
    fn allocate_variant_array_element(&mut self, indexes: &[usize], source_index: usize);

    /// Grows the array from `initial_size` by `count` slots, each a copy of
    /// the state at `source_index`.
    fn extend_variant_array_size(&mut self, initial_size: usize, count: usize, source_index: usize);

    /// Shrinks the array by `count` trailing slots.
    fn reduce_variant_array_size(&mut self, count: usize);

    /// Invalidates the slot at `index` without changing the array size; the
    /// slot may be reallocated later.
    fn delete_variant_array_element(&mut self, index: usize);
}

/// Shared handle to a stateful object registered with a variant manager.
pub type StatefulRef = Arc<Mutex<dyn MultiVariantObject + Send>>;

/// Dense per-variant storage: one slot per variant array index.
///
/// Slots at freed indices hold `None` until the index is reallocated. Most
/// stateful objects embed one `VariantArray` per variant-dependent attribute
/// group and delegate the [`MultiVariantObject`] callbacks to it. Arrays
/// serialize as a plain slot list, so snapshots taken under the same
/// manager geometry line up index for index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantArray<T: Clone> {
    variants: Vec<Option<T>>,
}

impl<T: Clone> VariantArray<T> {
    /// Builds an array sized to `variant_array_size`, filling every index in
    /// `variant_indexes` with a fresh value from `factory`.
    pub fn new<F>(variant_array_size: usize, variant_indexes: &[usize], mut factory: F) -> Self
    where
        F: FnMut() -> T,
    {
        let mut variants: Vec<Option<T>> = Vec::with_capacity(variant_array_size);
        variants.resize_with(variant_array_size, || None);
        for &index in variant_indexes {
            variants[index] = Some(factory());
        }
        Self { variants }
    }

    pub fn get(&self, index: usize) -> GvResult<&T> {
        match self.variants.get(index) {
            Some(Some(value)) => Ok(value),
            _ => Err(GvError::VariantNotFound(index.to_string())),
        }
    }

    pub fn get_mut(&mut self, index: usize) -> GvResult<&mut T> {
        match self.variants.get_mut(index) {
            Some(Some(value)) => Ok(value),
            _ => Err(GvError::VariantNotFound(index.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl<T: Clone> MultiVariantObject for VariantArray<T> {
    fn allocate_variant_array_element(&mut self, indexes: &[usize], source_index: usize) {
        let source = self.variants[source_index].clone();
        for &index in indexes {
            self.variants[index] = source.clone();
        }
    }

    fn extend_variant_array_size(
        &mut self,
        initial_size: usize,
        count: usize,
        source_index: usize,
    ) {
        debug_assert_eq!(initial_size, self.variants.len());
        let source = self.variants[source_index].clone();
        for _ in 0..count {
            self.variants.push(source.clone());
        }
    }

    fn reduce_variant_array_size(&mut self, count: usize) {
        self.variants.truncate(self.variants.len() - count);
    }

    fn delete_variant_array_element(&mut self, index: usize) {
        self.variants[index] = None;
    }
}
