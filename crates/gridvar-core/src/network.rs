//! Network facade: owns the variant manager and the roster of stateful
//! objects it fans out to.

use std::sync::{Arc, Mutex};

use crate::error::GvResult;
use crate::multi_variant::{MultiVariantObject, StatefulRef};
use crate::variant_manager::VariantManager;

/// Owner of one variant manager and every stateful object registered against
/// it.
///
/// Domain entities register themselves at construction; from then on every
/// variant clone or removal resizes their per-variant storage in lockstep.
/// The registration list only grows: dropping an entity while its network
/// lives is not part of the model.
pub struct Network {
    id: String,
    variant_manager: VariantManager,
    stateful_objects: Vec<StatefulRef>,
}

impl Network {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variant_manager: VariantManager::new(),
            stateful_objects: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn variant_manager(&self) -> &VariantManager {
        &self.variant_manager
    }

    /// Registers a stateful object for variant fan-out and returns the
    /// shared handle under which it was registered.
    pub fn register_stateful<T>(&mut self, object: T) -> Arc<Mutex<T>>
    where
        T: MultiVariantObject + Send + 'static,
    {
        let handle = Arc::new(Mutex::new(object));
        self.stateful_objects.push(handle.clone());
        handle
    }

    pub fn clone_variant(&self, source_variant_id: &str, target_variant_id: &str) -> GvResult<()> {
        self.variant_manager
            .clone_variant(source_variant_id, target_variant_id, &self.stateful_objects)
    }

    pub fn clone_variants(
        &self,
        source_variant_id: &str,
        target_variant_ids: &[&str],
        may_overwrite: bool,
    ) -> GvResult<()> {
        self.variant_manager.clone_variants(
            source_variant_id,
            target_variant_ids,
            may_overwrite,
            &self.stateful_objects,
        )
    }

    pub fn remove_variant(&self, variant_id: &str) -> GvResult<()> {
        self.variant_manager
            .remove_variant(variant_id, &self.stateful_objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multi_variant::VariantArray;
    use crate::variant_manager::{INITIAL_VARIANT_ID, INITIAL_VARIANT_INDEX};

    #[test]
    fn registered_objects_follow_variant_changes() {
        let mut network = Network::new("test");
        let load = network.register_stateful(VariantArray::new(
            1,
            &[INITIAL_VARIANT_INDEX],
            || 100.0,
        ));
        let generator = network.register_stateful(VariantArray::new(
            1,
            &[INITIAL_VARIANT_INDEX],
            || 50.0,
        ));

        network.clone_variant(INITIAL_VARIANT_ID, "contingency").unwrap();
        assert_eq!(load.lock().unwrap().len(), 2);
        assert_eq!(generator.lock().unwrap().len(), 2);
        assert_eq!(load.lock().unwrap().get(1), Ok(&100.0));

        // Writes to one variant never bleed into another.
        network.variant_manager().set_working_variant("contingency").unwrap();
        let index = network.variant_manager().working_variant_index().unwrap();
        *load.lock().unwrap().get_mut(index).unwrap() = 80.0;
        assert_eq!(load.lock().unwrap().get(INITIAL_VARIANT_INDEX), Ok(&100.0));
        assert_eq!(load.lock().unwrap().get(index), Ok(&80.0));

        network.remove_variant("contingency").unwrap();
        assert_eq!(load.lock().unwrap().len(), 1);
        assert_eq!(generator.lock().unwrap().len(), 1);
    }

    #[test]
    fn network_reports_id() {
        let network = Network::new("sim");
        assert_eq!(network.id(), "sim");
        assert_eq!(
            network.variant_manager().working_variant_id().unwrap(),
            INITIAL_VARIANT_ID
        );
    }
}
