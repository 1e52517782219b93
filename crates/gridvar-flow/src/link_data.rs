//! Two-port admittance math shared by branch and transformer flow
//! calculations.
//!
//! A branch between buses 1 and 2 is described by its 2x2 nodal admittance
//! matrix: `i1 = y11 v1 + y12 v2`, `i2 = y21 v1 + y22 v2`. Everything here
//! works in per-unit complex arithmetic; angles are radians unless a name
//! says degrees.

use num_complex::Complex64;

/// Side of a two-terminal branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSide {
    One,
    Two,
}

/// 2x2 nodal admittance matrix of a branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchAdmittanceMatrix {
    pub y11: Complex64,
    pub y12: Complex64,
    pub y21: Complex64,
    pub y22: Complex64,
}

impl Default for BranchAdmittanceMatrix {
    fn default() -> Self {
        let zero = Complex64::new(0.0, 0.0);
        Self {
            y11: zero,
            y12: zero,
            y21: zero,
            y22: zero,
        }
    }
}

/// Complex power at both ends of a branch, as seen entering each end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flow {
    pub from_to: Complex64,
    pub to_from: Complex64,
}

/// Nodal admittance matrix of a branch with series impedance `r + jx`,
/// shunt admittances `ysh1`/`ysh2` and a complex ratio `ratio * e^(j angle)`
/// at each end.
///
/// A zero series impedance yields a matrix built from the shunts alone.
pub fn calculate_branch_admittance(
    r: f64,
    x: f64,
    ratio1: f64,
    angle1: f64,
    ratio2: f64,
    angle2: f64,
    ysh1: Complex64,
    ysh2: Complex64,
) -> BranchAdmittanceMatrix {
    let a1 = Complex64::from_polar(ratio1, angle1);
    let a2 = Complex64::from_polar(ratio2, angle2);

    let ytr = if r != 0.0 || x != 0.0 {
        Complex64::new(1.0, 0.0) / Complex64::new(r, x)
    } else {
        Complex64::new(0.0, 0.0)
    };

    BranchAdmittanceMatrix {
        y11: (ytr + ysh1) / (a1.conj() * a1),
        y12: -ytr / (a1.conj() * a2),
        y21: -ytr / (a2.conj() * a1),
        y22: (ytr + ysh2) / (a2.conj() * a2),
    }
}

/// Complex power entering each end given the end voltages in polar form.
pub fn flow_both_ends_polar(
    y11: Complex64,
    y12: Complex64,
    y21: Complex64,
    y22: Complex64,
    u1: f64,
    theta1: f64,
    u2: f64,
    theta2: f64,
) -> Flow {
    let v1 = Complex64::from_polar(u1, theta1);
    let v2 = Complex64::from_polar(u2, theta2);
    flow_both_ends(y11, y12, y21, y22, v1, v2)
}

/// Complex power entering each end: `s = conj(i) * v` with the currents
/// from the admittance matrix.
pub fn flow_both_ends(
    y11: Complex64,
    y12: Complex64,
    y21: Complex64,
    y22: Complex64,
    v1: Complex64,
    v2: Complex64,
) -> Flow {
    let ift = y12 * v2 + y11 * v1;
    let itf = y21 * v1 + y22 * v2;
    Flow {
        from_to: ift.conj() * v1,
        to_from: itf.conj() * v2,
    }
}

/// Complex power drawn by a shunt admittance at voltage `u ∠ theta`.
pub fn flow_yshunt(ysh: Complex64, u: f64, theta: f64) -> Complex64 {
    let v = Complex64::from_polar(u, theta);
    ysh.conj() * v.conj() * v
}

/// Replaces a near-zero reactance by `epsilon_x` when correction is enabled.
pub fn fixed_x(x: f64, epsilon_x: f64, apply_reactance_correction: bool) -> f64 {
    if x.abs() < epsilon_x && apply_reactance_correction {
        epsilon_x
    } else {
        x
    }
}

/// Phase displacement in degrees for a transformer phase-angle clock
/// position (30 degrees per clock hour), normalized to (-180, 180].
pub fn phase_angle_clock_degrees(phase_angle_clock: i32) -> f64 {
    let mut degrees = (f64::from(phase_angle_clock) * 30.0).rem_euclid(360.0);
    if degrees > 180.0 {
        degrees -= 360.0;
    }
    degrees
}

/// Equivalent shunt admittance at the closed end of a branch whose other
/// end is an antenna (open), by Kron reduction of the open node.
pub fn kron_antenna(
    y11: Complex64,
    y12: Complex64,
    y21: Complex64,
    y22: Complex64,
    is_open_from: bool,
) -> Complex64 {
    let zero = Complex64::new(0.0, 0.0);
    if is_open_from {
        if y11 != zero {
            return y22 - y21 * y12 / y11;
        }
    } else if y22 != zero {
        return y11 - y12 * y21 / y22;
    }
    zero
}

/// Admittance matrix of two branches chained through a common interior
/// node, with the interior node eliminated by Kron reduction.
///
/// `first_chain_node_side`/`second_chain_node_side` name which side of each
/// branch faces the common node.
pub fn kron_chain(
    first: &BranchAdmittanceMatrix,
    first_chain_node_side: BranchSide,
    second: &BranchAdmittanceMatrix,
    second_chain_node_side: BranchSide,
) -> BranchAdmittanceMatrix {
    let (y_first_11, y_first_1c, y_first_c1, y_first_cc) = match first_chain_node_side {
        BranchSide::Two => (first.y11, first.y12, first.y21, first.y22),
        BranchSide::One => (first.y22, first.y21, first.y12, first.y11),
    };
    let (y_second_22, y_second_2c, y_second_c2, y_second_cc) = match second_chain_node_side {
        BranchSide::Two => (second.y11, second.y12, second.y21, second.y22),
        BranchSide::One => (second.y22, second.y21, second.y12, second.y11),
    };

    let ycc = y_first_cc + y_second_cc;
    BranchAdmittanceMatrix {
        y11: y_first_11 - y_first_1c * y_first_c1 / ycc,
        y12: -y_first_1c * y_second_c2 / ycc,
        y21: -y_second_2c * y_first_c1 / ycc,
        y22: y_second_22 - y_second_2c * y_second_c2 / ycc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn assert_close(actual: Complex64, expected: Complex64) {
        assert!(
            (actual - expected).norm() < TOL,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn admittance_of_plain_series_branch() {
        // r + jx = j0.1, no shunts, unit ratios: y11 = y22 = -y12 = 1/jx.
        let adm = calculate_branch_admittance(
            0.0,
            0.1,
            1.0,
            0.0,
            1.0,
            0.0,
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
        );
        let ytr = Complex64::new(0.0, -10.0);
        assert_close(adm.y11, ytr);
        assert_close(adm.y22, ytr);
        assert_close(adm.y12, -ytr);
        assert_close(adm.y21, -ytr);
    }

    #[test]
    fn admittance_with_zero_impedance_keeps_shunts() {
        let ysh = Complex64::new(0.0, 2.5e-6);
        let adm = calculate_branch_admittance(0.0, 0.0, 1.0, 0.0, 1.0, 0.0, ysh, ysh);
        assert_close(adm.y11, ysh);
        assert_close(adm.y22, ysh);
        assert_close(adm.y12, Complex64::new(0.0, 0.0));
    }

    #[test]
    fn flow_across_reactance_matches_dc_approximation() {
        // Small angle, flat voltage: p ≈ delta / x and near-lossless.
        let x = 0.1;
        let adm = calculate_branch_admittance(
            0.0,
            x,
            1.0,
            0.0,
            1.0,
            0.0,
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
        );
        let delta = 0.01;
        let flow = flow_both_ends_polar(adm.y11, adm.y12, adm.y21, adm.y22, 1.0, delta, 1.0, 0.0);
        assert!((flow.from_to.re - delta / x).abs() < 1e-4);
        assert!((flow.from_to.re + flow.to_from.re).abs() < TOL);
    }

    #[test]
    fn shunt_flow_is_conjugate_power() {
        let ysh = Complex64::new(0.001, -0.05);
        let s = flow_yshunt(ysh, 1.02, 0.3);
        let v = Complex64::from_polar(1.02, 0.3);
        assert_close(s, ysh.conj() * v.norm_sqr());
    }

    #[test]
    fn fixed_x_applies_threshold() {
        assert_eq!(fixed_x(0.05, 0.1, true), 0.1);
        assert_eq!(fixed_x(-0.05, 0.1, true), 0.1);
        assert_eq!(fixed_x(0.05, 0.1, false), 0.05);
        assert_eq!(fixed_x(0.5, 0.1, true), 0.5);
    }

    #[test]
    fn phase_angle_clock_wraps() {
        assert_eq!(phase_angle_clock_degrees(0), 0.0);
        assert_eq!(phase_angle_clock_degrees(1), 30.0);
        assert_eq!(phase_angle_clock_degrees(6), 180.0);
        assert_eq!(phase_angle_clock_degrees(7), -150.0);
        assert_eq!(phase_angle_clock_degrees(11), -30.0);
        assert_eq!(phase_angle_clock_degrees(12), 0.0);
    }

    #[test]
    fn kron_antenna_of_pure_series_branch_is_zero() {
        // No shunts: an open series branch contributes nothing at the
        // closed end.
        let y = Complex64::new(0.0, -10.0);
        let ysh = kron_antenna(y, -y, -y, y, true);
        assert_close(ysh, Complex64::new(0.0, 0.0));
        let ysh = kron_antenna(y, -y, -y, y, false);
        assert_close(ysh, Complex64::new(0.0, 0.0));
    }

    #[test]
    fn kron_chain_of_two_series_reactances_adds_impedances() {
        // j0.1 chained with j0.2 through the interior node behaves as j0.3.
        let zero = Complex64::new(0.0, 0.0);
        let a = calculate_branch_admittance(0.0, 0.1, 1.0, 0.0, 1.0, 0.0, zero, zero);
        let b = calculate_branch_admittance(0.0, 0.2, 1.0, 0.0, 1.0, 0.0, zero, zero);
        let chained = kron_chain(&a, BranchSide::Two, &b, BranchSide::One);

        let expected = calculate_branch_admittance(0.0, 0.3, 1.0, 0.0, 1.0, 0.0, zero, zero);
        assert_close(chained.y11, expected.y11);
        assert_close(chained.y12, expected.y12);
        assert_close(chained.y21, expected.y21);
        assert_close(chained.y22, expected.y22);
    }
}
