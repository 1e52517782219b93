//! Variant life cycle: creation by cloning, removal, working-variant
//! selection, and fan-out of every array resize to the network's stateful
//! objects.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, trace};

use crate::error::{GvError, GvResult};
use crate::multi_variant::StatefulRef;
use crate::variant::{VariantContext, VariantContextGuard};

/// Id of the variant every network starts with.
pub const INITIAL_VARIANT_ID: &str = "InitialVariant";

/// Array index of the initial variant. Never recycled.
pub const INITIAL_VARIANT_INDEX: usize = 0;

#[derive(Debug)]
struct VariantsState {
    variants_by_id: HashMap<String, usize>,
    unused_indexes: BTreeSet<usize>,
    variant_array_size: usize,
}

/// Single authority for the set of named variants of one network.
///
/// Structural changes (`clone_variants`, `remove_variant`) run under one
/// mutex for their whole duration, including the fan-out to every stateful
/// object, so no object ever observes a torn array geometry. The working
/// variant selection lives in a separate [`VariantContext`] and is not
/// serialized against structural changes: a thread working on a variant that
/// another thread concurrently removes is a caller-contract violation.
#[derive(Debug)]
pub struct VariantManager {
    state: Mutex<VariantsState>,
    context: Mutex<VariantContext>,
}

impl Default for VariantManager {
    fn default() -> Self {
        Self::new()
    }
}

impl VariantManager {
    /// Creates a manager holding only the initial variant, selected as the
    /// working variant.
    pub fn new() -> Self {
        let mut variants_by_id = HashMap::new();
        variants_by_id.insert(INITIAL_VARIANT_ID.to_string(), INITIAL_VARIANT_INDEX);
        Self {
            state: Mutex::new(VariantsState {
                variants_by_id,
                unused_indexes: BTreeSet::new(),
                variant_array_size: 1,
            }),
            context: Mutex::new(VariantContext::Multiple(Some(INITIAL_VARIANT_INDEX))),
        }
    }

    /// Snapshot of all variant ids, sorted for stable output.
    pub fn variant_ids(&self) -> Vec<String> {
        let state = self.lock_state();
        let mut ids: Vec<String> = state.variants_by_id.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Snapshot of all allocated variant indexes, ascending.
    pub fn variant_indexes(&self) -> Vec<usize> {
        let state = self.lock_state();
        let mut indexes: Vec<usize> = state.variants_by_id.values().copied().collect();
        indexes.sort_unstable();
        indexes
    }

    pub fn variant_array_size(&self) -> usize {
        self.lock_state().variant_array_size
    }

    /// Index of the calling context's working variant.
    pub fn working_variant_index(&self) -> GvResult<usize> {
        self.lock_context().variant_index()
    }

    /// Id of the calling context's working variant.
    pub fn working_variant_id(&self) -> GvResult<String> {
        let index = self.lock_context().variant_index()?;
        let state = self.lock_state();
        state
            .variants_by_id
            .iter()
            .find(|(_, &i)| i == index)
            .map(|(id, _)| id.clone())
            .ok_or_else(|| GvError::VariantNotFound(index.to_string()))
    }

    /// Selects `variant_id` as the working variant for the calling context.
    pub fn set_working_variant(&self, variant_id: &str) -> GvResult<()> {
        let index = {
            let state = self.lock_state();
            *state
                .variants_by_id
                .get(variant_id)
                .ok_or_else(|| GvError::VariantNotFound(variant_id.to_string()))?
        };
        self.lock_context().set_variant_index(index);
        Ok(())
    }

    /// Clones `source_variant_id` under a single new id.
    pub fn clone_variant(
        &self,
        source_variant_id: &str,
        target_variant_id: &str,
        objects: &[StatefulRef],
    ) -> GvResult<()> {
        self.clone_variants(source_variant_id, &[target_variant_id], false, objects)
    }

    /// Clones `source_variant_id` under each of `target_variant_ids`,
    /// fanning the resulting array changes out to `objects`.
    ///
    /// Targets that already exist are rejected unless `may_overwrite`, in
    /// which case they keep their index and get the source state copied over.
    /// Validation of every target happens before any state is touched, so a
    /// rejected call leaves the manager and all objects unchanged. Duplicate
    /// ids within the target list are always rejected.
    pub fn clone_variants(
        &self,
        source_variant_id: &str,
        target_variant_ids: &[&str],
        may_overwrite: bool,
        objects: &[StatefulRef],
    ) -> GvResult<()> {
        if target_variant_ids.is_empty() {
            return Err(GvError::EmptyTargetVariantList);
        }
        debug!("Creating variants [{}]", target_variant_ids.join(", "));

        let mut state = self.lock_state();
        let source_index = *state
            .variants_by_id
            .get(source_variant_id)
            .ok_or_else(|| GvError::VariantNotFound(source_variant_id.to_string()))?;

        let mut seen = HashSet::new();
        for &target in target_variant_ids {
            let exists = state.variants_by_id.contains_key(target);
            if !seen.insert(target) || (exists && !may_overwrite) {
                return Err(GvError::VariantAlreadyExists(target.to_string()));
            }
        }

        let initial_size = state.variant_array_size;
        let mut recycled = BTreeSet::new();
        let mut overwritten = BTreeSet::new();
        let mut extended_count = 0;
        for &target in target_variant_ids {
            if let Some(&existing) = state.variants_by_id.get(target) {
                overwritten.insert(existing);
                continue;
            }
            let index = match state.unused_indexes.pop_first() {
                Some(index) => {
                    recycled.insert(index);
                    index
                }
                None => {
                    let index = state.variant_array_size;
                    state.variant_array_size += 1;
                    extended_count += 1;
                    index
                }
            };
            state.variants_by_id.insert(target.to_string(), index);
        }

        if !recycled.is_empty() {
            trace!("Recycling variant array indexes {:?}", recycled);
            let indexes: Vec<usize> = recycled.iter().copied().collect();
            for object in objects {
                lock_object(object).allocate_variant_array_element(&indexes, source_index);
            }
        }
        if !overwritten.is_empty() {
            trace!("Overwriting variant array indexes {:?}", overwritten);
            let indexes: Vec<usize> = overwritten.iter().copied().collect();
            for object in objects {
                lock_object(object).allocate_variant_array_element(&indexes, source_index);
            }
        }
        if extended_count > 0 {
            trace!(
                "Extending variant array size to {} (+{})",
                state.variant_array_size,
                extended_count
            );
            for object in objects {
                lock_object(object).extend_variant_array_size(
                    initial_size,
                    extended_count,
                    source_index,
                );
            }
        }
        Ok(())
    }

    /// Removes a variant, releasing its index.
    ///
    /// Removing the highest occupied index shrinks the array, cascading over
    /// any already-free indexes immediately below it; removing any other
    /// index marks it free for recycling. A working-variant selection
    /// pointing at the removed index is cleared for the calling context.
    pub fn remove_variant(&self, variant_id: &str, objects: &[StatefulRef]) -> GvResult<()> {
        if variant_id == INITIAL_VARIANT_ID {
            return Err(GvError::RemovingInitialVariantForbidden);
        }

        let index = {
            let mut state = self.lock_state();
            let index = *state
                .variants_by_id
                .get(variant_id)
                .ok_or_else(|| GvError::VariantNotFound(variant_id.to_string()))?;
            debug!("Removing variant '{}'", variant_id);
            state.variants_by_id.remove(variant_id);

            if index == state.variant_array_size - 1 {
                let mut count = 1;
                let mut i = index;
                while i > INITIAL_VARIANT_INDEX && state.unused_indexes.remove(&(i - 1)) {
                    count += 1;
                    i -= 1;
                }
                state.variant_array_size -= count;
                trace!("Reducing variant array size to {}", state.variant_array_size);
                for object in objects {
                    lock_object(object).reduce_variant_array_size(count);
                }
            } else {
                state.unused_indexes.insert(index);
                trace!("Deleting variant array element at index {}", index);
                for object in objects {
                    lock_object(object).delete_variant_array_element(index);
                }
            }
            index
        };

        self.lock_context().reset_if_variant_index_is(index);
        Ok(())
    }

    /// Invokes `f` once per known variant with the working variant switched
    /// to it, in id order; the previous selection is restored afterwards,
    /// even if `f` panics.
    ///
    /// The manager's locks are held for the whole iteration, so `f` must not
    /// call back into this manager; it receives the variant id and index
    /// directly instead.
    pub fn for_each_variant<F>(&self, mut f: F)
    where
        F: FnMut(&str, usize),
    {
        let state = self.lock_state();
        let mut entries: Vec<(&String, usize)> = state
            .variants_by_id
            .iter()
            .map(|(id, &index)| (id, index))
            .collect();
        entries.sort();

        let mut context = self.lock_context();
        let mut guard = VariantContextGuard::new(&mut context);
        for (id, index) in entries {
            guard.context_mut().set_variant_index(index);
            f(id, index);
        }
    }

    /// Switches the context between scalar and per-thread representations.
    ///
    /// The current selection migrates into the new representation when one
    /// is set. Otherwise the per-thread form starts unset (missing per-thread
    /// setup should fail loudly) while the scalar form falls back to the
    /// initial variant. No-op when already in the requested mode.
    pub fn allow_variant_multi_thread_access(&self, allow: bool) {
        let mut context = self.lock_context();
        match (&*context, allow) {
            (VariantContext::ThreadLocal(_), true) | (VariantContext::Multiple(_), false) => {}
            (_, true) => {
                let saved = context.variant_index().ok();
                *context = VariantContext::ThreadLocal(HashMap::new());
                if let Some(index) = saved {
                    context.set_variant_index(index);
                }
            }
            (_, false) => {
                let index = context.variant_index().unwrap_or(INITIAL_VARIANT_INDEX);
                *context = VariantContext::Multiple(Some(index));
            }
        }
    }

    pub fn is_variant_multi_thread_access_allowed(&self) -> bool {
        self.lock_context().is_multi_thread()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, VariantsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_context(&self) -> std::sync::MutexGuard<'_, VariantContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_object(
    object: &StatefulRef,
) -> std::sync::MutexGuard<'_, dyn crate::multi_variant::MultiVariantObject + Send + 'static> {
    object.lock().unwrap_or_else(PoisonError::into_inner)
}
