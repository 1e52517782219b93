//! Unified error type for the gridvar ecosystem
//!
//! This module provides a common error type [`GvError`] covering every failure
//! the core can report: lookup failures (an id or index that does not denote a
//! live object), referential-integrity violations (removals that would leave
//! dangling references), uniqueness violations, uninitialized-context access
//! and internal consistency breaches.
//!
//! None of these conditions are retried anywhere in the core: they signal a
//! caller-contract violation and propagate unchanged to whatever orchestration
//! layer invoked the operation.

use thiserror::Error;

/// Unified error type for all gridvar operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GvError {
    /// A vertex index that is out of range or whose slot has been freed.
    #[error("Vertex {0} not found")]
    VertexNotFound(usize),

    /// An edge index that is out of range or whose slot has been freed.
    #[error("Edge {0} not found")]
    EdgeNotFound(usize),

    /// Attempted to remove a vertex that still has incident edges.
    #[error("An edge is connected to the vertex {0}")]
    EdgeConnectedToVertex(usize),

    /// Attempted to remove all vertices while edges remain.
    #[error("Cannot remove all vertices because there is still some edges in the graph")]
    EdgesStillPresent,

    /// Internal consistency breach: an edge listed as incident to a vertex
    /// does not actually reference it.
    #[error("Edge {0} is not connected to vertex {1}")]
    EdgeNotIncident(usize, usize),

    /// A variant id that is not registered.
    #[error("Variant '{0}' not found")]
    VariantNotFound(String),

    /// Attempted to create a variant under an id that is already taken.
    #[error("Target variant '{0}' already exists")]
    VariantAlreadyExists(String),

    /// Attempted to remove the initial variant.
    #[error("Removing initial variant is forbidden")]
    RemovingInitialVariantForbidden,

    /// `clone_variants` was called with no target ids.
    #[error("Empty target variant id list")]
    EmptyTargetVariantList,

    /// The calling context read the working variant before establishing it.
    #[error("Variant index not set")]
    VariantIndexNotSet,
}

/// Convenience type alias for Results using GvError.
pub type GvResult<T> = Result<T, GvError>;
