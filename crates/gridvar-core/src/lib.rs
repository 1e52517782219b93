//! # gridvar-core: Variant Management and Topology Graph Core
//!
//! Provides the two building blocks every gridvar analysis sits on:
//!
//! - a **variant subsystem**: named alternate states of a whole network
//!   (contingency and what-if scenarios), stored as one array slot per
//!   variant in every stateful object and kept in lockstep by a central
//!   [`VariantManager`];
//! - an **undirected graph engine** ([`UndirectedGraph`]): a generic
//!   multigraph over dense integer ids with free-slot recycling, a lazily
//!   rebuilt adjacency cache, cancellable DFS traversal, and exhaustive
//!   simple-path enumeration, used to model substation and network
//!   topology.
//!
//! ## Variants in a nutshell
//!
//! ```rust,no_run
//! use gridvar_core::{Network, VariantArray, INITIAL_VARIANT_ID, INITIAL_VARIANT_INDEX};
//!
//! let mut network = Network::new("sim");
//!
//! // A load's per-variant set-point, registered for variant fan-out.
//! let p0 = network.register_stateful(VariantArray::new(
//!     1,
//!     &[INITIAL_VARIANT_INDEX],
//!     || 100.0,
//! ));
//!
//! // Clone the initial variant and diverge the load in the clone only.
//! network.clone_variant(INITIAL_VARIANT_ID, "contingency")?;
//! network.variant_manager().set_working_variant("contingency")?;
//! let index = network.variant_manager().working_variant_index()?;
//! *p0.lock().unwrap().get_mut(index)? = 80.0;
//! # Ok::<(), gridvar_core::GvError>(())
//! ```
//!
//! ## Core types
//!
//! - [`VariantManager`] - variant life cycle and working-variant selection
//! - [`MultiVariantObject`] / [`VariantArray`] - per-variant state storage
//! - [`Network`] - owner of one manager plus its stateful objects
//! - [`UndirectedGraph`] - topology container and algorithms
//! - [`graph_utils`] - connected-component analysis

pub mod error;
pub mod graph;
pub mod graph_utils;
pub mod multi_variant;
pub mod network;
pub(crate) mod variant;
pub mod variant_manager;

pub use error::{GvError, GvResult};
pub use graph::{Path, TraverseResult, UndirectedGraph};
pub use graph_utils::{compute_connected_components, ConnectedComponentsResult};
pub use multi_variant::{MultiVariantObject, StatefulRef, VariantArray};
pub use network::Network;
pub use variant_manager::{VariantManager, INITIAL_VARIANT_ID, INITIAL_VARIANT_INDEX};
