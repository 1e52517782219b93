//! # gridvar-flow: Branch and Switch Flow Utilities
//!
//! Post-load-flow electrical calculations on top of the gridvar-core
//! topology primitives:
//!
//! - [`link_data`] - two-port admittance matrices, flows at both ends of a
//!   branch, Kron reduction helpers
//! - [`twt_data`] - flows and star-bus voltage of a three-windings
//!   transformer under every leg connectivity pattern
//! - [`switches_flow`] - distribution of node injections over the closed
//!   switches of a voltage level via spanning trees per island
//!
//! All complex arithmetic uses `num_complex::Complex64`; voltages are kV
//! with angles in radians, powers MW/MVAr.

pub mod link_data;
pub mod switches_flow;
pub mod twt_data;

pub use link_data::{
    calculate_branch_admittance, fixed_x, flow_both_ends, flow_both_ends_polar, flow_yshunt,
    kron_antenna, kron_chain, phase_angle_clock_degrees, BranchAdmittanceMatrix, BranchSide, Flow,
};
pub use switches_flow::{Injection, SwitchDef, SwitchFlow, SwitchesFlow};
pub use twt_data::{Side, TapStep, TwtData, TwtLeg, TwtParameters};
