//! Electrical state of a three-windings transformer.
//!
//! Each leg is reduced to its branch admittance matrix toward the internal
//! star bus; flows and the star-bus voltage then follow from whichever legs
//! are connected with a usable bus voltage. Legs that cannot contribute get
//! a zero flow, and a fully disconnected transformer computes to NaN
//! throughout.

use num_complex::Complex64;

use crate::link_data::{
    self, BranchAdmittanceMatrix, BranchSide,
};

/// Side (winding) of a three-windings transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    One,
    Two,
    Three,
}

impl Side {
    fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
            Side::Three => 2,
        }
    }
}

/// Current step of a ratio or phase tap changer.
///
/// `rho` is a ratio multiplier, `alpha` a phase shift in degrees, and the
/// remaining fields percent corrections applied to the leg's nominal
/// r/x/g/b.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapStep {
    pub rho: f64,
    pub alpha: f64,
    pub r: f64,
    pub x: f64,
    pub g: f64,
    pub b: f64,
}

impl TapStep {
    /// Neutral ratio step: scale `rho`, correct nothing.
    pub fn ratio(rho: f64) -> Self {
        Self {
            rho,
            alpha: 0.0,
            r: 0.0,
            x: 0.0,
            g: 0.0,
            b: 0.0,
        }
    }

    /// Neutral phase step: shift by `alpha` degrees, correct nothing.
    pub fn phase(rho: f64, alpha: f64) -> Self {
        Self {
            rho,
            alpha,
            r: 0.0,
            x: 0.0,
            g: 0.0,
            b: 0.0,
        }
    }
}

/// One leg (winding) of a three-windings transformer, as seen from its
/// terminal: nominal electrical characteristics, optional tap changers, and
/// the solved bus state.
#[derive(Debug, Clone, PartialEq)]
pub struct TwtLeg {
    pub r: f64,
    pub x: f64,
    pub g: f64,
    pub b: f64,
    pub rated_u: f64,
    pub ratio_step: Option<TapStep>,
    pub phase_step: Option<TapStep>,
    /// Terminal flow, NaN when unknown.
    pub p: f64,
    pub q: f64,
    /// Bus voltage magnitude in kV, NaN when the bus is unsolved.
    pub u: f64,
    /// Bus voltage angle in radians, NaN when the bus is unsolved.
    pub theta: f64,
    pub connected: bool,
    pub main_component: bool,
}

impl TwtLeg {
    pub fn new(r: f64, x: f64, g: f64, b: f64, rated_u: f64) -> Self {
        Self {
            r,
            x,
            g,
            b,
            rated_u,
            ratio_step: None,
            phase_step: None,
            p: f64::NAN,
            q: f64::NAN,
            u: f64::NAN,
            theta: f64::NAN,
            connected: true,
            main_component: true,
        }
    }

    pub fn with_voltage(mut self, u: f64, theta: f64) -> Self {
        self.u = u;
        self.theta = theta;
        self
    }

    pub fn with_flow(mut self, p: f64, q: f64) -> Self {
        self.p = p;
        self.q = q;
        self
    }

    pub fn with_ratio_step(mut self, step: TapStep) -> Self {
        self.ratio_step = Some(step);
        self
    }

    pub fn with_phase_step(mut self, step: TapStep) -> Self {
        self.phase_step = Some(step);
        self
    }

    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }
}

/// Knobs of the [`TwtData`] computation.
#[derive(Debug, Clone, Copy)]
pub struct TwtParameters {
    /// Phase-angle clock position of winding 2 relative to winding 1.
    pub phase_angle_clock2: i32,
    /// Phase-angle clock position of winding 3 relative to winding 1.
    pub phase_angle_clock3: i32,
    pub epsilon_x: f64,
    pub apply_reactance_correction: bool,
    /// Split each leg's shunt admittance across both ends of the leg
    /// instead of lumping it at the network end.
    pub split_shunt_admittance: bool,
}

impl Default for TwtParameters {
    fn default() -> Self {
        Self {
            phase_angle_clock2: 0,
            phase_angle_clock3: 0,
            epsilon_x: 0.0,
            apply_reactance_correction: false,
            split_shunt_admittance: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SideValues {
    p: f64,
    q: f64,
    u: f64,
    theta: f64,
    r: f64,
    x: f64,
    g1: f64,
    b1: f64,
    g2: f64,
    b2: f64,
    alpha: f64,
    rho: f64,
    rated_u: f64,
    connected: bool,
    main_component: bool,
    computed_p: f64,
    computed_q: f64,
}

/// Computed flows and star-bus voltage of one three-windings transformer.
#[derive(Debug, Clone)]
pub struct TwtData {
    id: String,
    sides: [SideValues; 3],
    star_u: f64,
    star_theta: f64,
    phase_angle_clock2: i32,
    phase_angle_clock3: i32,
    rated_u0: f64,
}

impl TwtData {
    pub fn new(
        id: impl Into<String>,
        legs: [TwtLeg; 3],
        rated_u0: f64,
        parameters: TwtParameters,
    ) -> Self {
        let split = parameters.split_shunt_admittance;
        let mut sides: Vec<SideValues> = legs
            .iter()
            .map(|leg| SideValues {
                p: leg.p,
                q: leg.q,
                u: if leg.connected { leg.u } else { f64::NAN },
                theta: if leg.connected { leg.theta } else { f64::NAN },
                r: corrected(leg.r, leg, |s| s.r),
                x: link_data::fixed_x(
                    corrected(leg.x, leg, |s| s.x),
                    parameters.epsilon_x,
                    parameters.apply_reactance_correction,
                ),
                g1: corrected(if split { leg.g / 2.0 } else { leg.g }, leg, |s| s.g),
                b1: corrected(if split { leg.b / 2.0 } else { leg.b }, leg, |s| s.b),
                g2: corrected(if split { leg.g / 2.0 } else { 0.0 }, leg, |s| s.g),
                b2: corrected(if split { leg.b / 2.0 } else { 0.0 }, leg, |s| s.b),
                alpha: leg
                    .phase_step
                    .map(|step| step.alpha.to_radians())
                    .unwrap_or(0.0),
                rho: rho(leg, rated_u0),
                rated_u: leg.rated_u,
                connected: leg.connected,
                main_component: leg.main_component,
                computed_p: f64::NAN,
                computed_q: f64::NAN,
            })
            .collect();

        let angle1 = -sides[0].alpha;
        let angle2 = -sides[1].alpha
            - link_data::phase_angle_clock_degrees(parameters.phase_angle_clock2).to_radians();
        let angle3 = -sides[2].alpha
            - link_data::phase_angle_clock_degrees(parameters.phase_angle_clock3).to_radians();

        let adm: Vec<BranchAdmittanceMatrix> = sides
            .iter()
            .zip([angle1, angle2, angle3])
            .map(|(side, angle)| {
                link_data::calculate_branch_admittance(
                    side.r,
                    side.x,
                    1.0 / side.rho,
                    angle,
                    1.0,
                    0.0,
                    Complex64::new(side.g1, side.b1),
                    Complex64::new(side.g2, side.b2),
                )
            })
            .collect();

        let usable = [
            sides[0].connected && valid(sides[0].u, sides[0].theta),
            sides[1].connected && valid(sides[1].u, sides[1].theta),
            sides[2].connected && valid(sides[2].u, sides[2].theta),
        ];

        // One case per connectivity pattern; flows on legs that cannot
        // contribute are zero, and NaN when nothing is connected at all.
        let (flows, star) = match usable {
            [true, true, true] => three_connected_legs(&sides, &adm),
            [true, true, false] => {
                let (flow, v0) = two_connected_legs(
                    (sides[0].u, sides[0].theta),
                    (sides[1].u, sides[1].theta),
                    &adm[0],
                    &adm[1],
                    &adm[2],
                );
                (
                    [
                        (flow.from_to.re, flow.from_to.im),
                        (flow.to_from.re, flow.to_from.im),
                        (0.0, 0.0),
                    ],
                    v0,
                )
            }
            [true, false, true] => {
                let (flow, v0) = two_connected_legs(
                    (sides[0].u, sides[0].theta),
                    (sides[2].u, sides[2].theta),
                    &adm[0],
                    &adm[2],
                    &adm[1],
                );
                (
                    [
                        (flow.from_to.re, flow.from_to.im),
                        (0.0, 0.0),
                        (flow.to_from.re, flow.to_from.im),
                    ],
                    v0,
                )
            }
            [false, true, true] => {
                let (flow, v0) = two_connected_legs(
                    (sides[1].u, sides[1].theta),
                    (sides[2].u, sides[2].theta),
                    &adm[1],
                    &adm[2],
                    &adm[0],
                );
                (
                    [
                        (0.0, 0.0),
                        (flow.from_to.re, flow.from_to.im),
                        (flow.to_from.re, flow.to_from.im),
                    ],
                    v0,
                )
            }
            [true, false, false] => {
                let (s, v0) = one_connected_leg(
                    (sides[0].u, sides[0].theta),
                    &adm[0],
                    &adm[1],
                    &adm[2],
                );
                ([(s.re, s.im), (0.0, 0.0), (0.0, 0.0)], v0)
            }
            [false, true, false] => {
                let (s, v0) = one_connected_leg(
                    (sides[1].u, sides[1].theta),
                    &adm[1],
                    &adm[0],
                    &adm[2],
                );
                ([(0.0, 0.0), (s.re, s.im), (0.0, 0.0)], v0)
            }
            [false, false, true] => {
                let (s, v0) = one_connected_leg(
                    (sides[2].u, sides[2].theta),
                    &adm[2],
                    &adm[0],
                    &adm[1],
                );
                ([(0.0, 0.0), (0.0, 0.0), (s.re, s.im)], v0)
            }
            [false, false, false] => {
                let nan = (f64::NAN, f64::NAN);
                ([nan, nan, nan], Complex64::new(f64::NAN, f64::NAN))
            }
        };

        for (side, (p, q)) in sides.iter_mut().zip(flows) {
            side.computed_p = p;
            side.computed_q = q;
        }

        Self {
            id: id.into(),
            sides: [sides[0], sides[1], sides[2]],
            star_u: star.norm(),
            star_theta: star.arg(),
            phase_angle_clock2: parameters.phase_angle_clock2,
            phase_angle_clock3: parameters.phase_angle_clock3,
            rated_u0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn computed_p(&self, side: Side) -> f64 {
        self.sides[side.index()].computed_p
    }

    pub fn computed_q(&self, side: Side) -> f64 {
        self.sides[side.index()].computed_q
    }

    pub fn p(&self, side: Side) -> f64 {
        self.sides[side.index()].p
    }

    pub fn q(&self, side: Side) -> f64 {
        self.sides[side.index()].q
    }

    pub fn u(&self, side: Side) -> f64 {
        self.sides[side.index()].u
    }

    pub fn theta(&self, side: Side) -> f64 {
        self.sides[side.index()].theta
    }

    pub fn r(&self, side: Side) -> f64 {
        self.sides[side.index()].r
    }

    pub fn x(&self, side: Side) -> f64 {
        self.sides[side.index()].x
    }

    pub fn g1(&self, side: Side) -> f64 {
        self.sides[side.index()].g1
    }

    pub fn b1(&self, side: Side) -> f64 {
        self.sides[side.index()].b1
    }

    pub fn g2(&self, side: Side) -> f64 {
        self.sides[side.index()].g2
    }

    pub fn b2(&self, side: Side) -> f64 {
        self.sides[side.index()].b2
    }

    pub fn rated_u(&self, side: Side) -> f64 {
        self.sides[side.index()].rated_u
    }

    pub fn is_connected(&self, side: Side) -> bool {
        self.sides[side.index()].connected
    }

    pub fn is_main_component(&self, side: Side) -> bool {
        self.sides[side.index()].main_component
    }

    /// Voltage magnitude at the internal star bus.
    pub fn star_u(&self) -> f64 {
        self.star_u
    }

    /// Voltage angle at the internal star bus, radians.
    pub fn star_theta(&self) -> f64 {
        self.star_theta
    }

    pub fn phase_angle_clock2(&self) -> i32 {
        self.phase_angle_clock2
    }

    pub fn phase_angle_clock3(&self) -> i32 {
        self.phase_angle_clock3
    }

    pub fn rated_u0(&self) -> f64 {
        self.rated_u0
    }
}

/// Tap-step corrections multiply: `value * (1 + rtc%/100) * (1 + ptc%/100)`.
fn corrected(value: f64, leg: &TwtLeg, field: fn(&TapStep) -> f64) -> f64 {
    let rtc = leg.ratio_step.as_ref().map(field).unwrap_or(0.0);
    let ptc = leg.phase_step.as_ref().map(field).unwrap_or(0.0);
    value * (1.0 + rtc / 100.0) * (1.0 + ptc / 100.0)
}

fn rho(leg: &TwtLeg, rated_u0: f64) -> f64 {
    let mut rho = rated_u0 / leg.rated_u;
    if let Some(step) = leg.ratio_step {
        rho *= step.rho;
    }
    if let Some(step) = leg.phase_step {
        rho *= step.rho;
    }
    rho
}

fn valid(voltage: f64, theta: f64) -> bool {
    if voltage.is_nan() || voltage <= 0.0 {
        return false;
    }
    !theta.is_nan()
}

type SideFlows = [(f64, f64); 3];

fn three_connected_legs(
    sides: &[SideValues],
    adm: &[BranchAdmittanceMatrix],
) -> (SideFlows, Complex64) {
    let v1 = Complex64::from_polar(sides[0].u, sides[0].theta);
    let v2 = Complex64::from_polar(sides[1].u, sides[1].theta);
    let v3 = Complex64::from_polar(sides[2].u, sides[2].theta);

    let v0 = -(adm[0].y21 * v1 + adm[1].y21 * v2 + adm[2].y21 * v3)
        / (adm[0].y22 + adm[1].y22 + adm[2].y22);

    let flows = [(v1, &adm[0]), (v2, &adm[1]), (v3, &adm[2])].map(|(v, a)| {
        let flow = link_data::flow_both_ends(a.y11, a.y12, a.y21, a.y22, v, v0);
        (flow.from_to.re, flow.from_to.im)
    });
    (flows, v0)
}

/// Both closed legs chained through the star bus, with the open leg folded
/// in as a shunt at the star bus.
fn two_connected_legs(
    (u1, theta1): (f64, f64),
    (u2, theta2): (f64, f64),
    leg1: &BranchAdmittanceMatrix,
    leg2: &BranchAdmittanceMatrix,
    open_leg: &BranchAdmittanceMatrix,
) -> (link_data::Flow, Complex64) {
    let v1 = Complex64::from_polar(u1, theta1);
    let v2 = Complex64::from_polar(u2, theta2);

    let ysh = link_data::kron_antenna(open_leg.y11, open_leg.y12, open_leg.y21, open_leg.y22, true);
    let leg2_mod = BranchAdmittanceMatrix {
        y22: leg2.y22 + ysh,
        ..*leg2
    };
    let adm = link_data::kron_chain(leg1, BranchSide::Two, &leg2_mod, BranchSide::Two);
    let flow = link_data::flow_both_ends(adm.y11, adm.y12, adm.y21, adm.y22, v1, v2);

    let v0 = -(leg1.y21 * v1 + leg2.y21 * v2) / (leg1.y22 + leg2.y22 + ysh);
    (flow, v0)
}

/// The closed leg sees both open legs as antenna shunts at the star bus.
fn one_connected_leg(
    (u, theta): (f64, f64),
    close_leg: &BranchAdmittanceMatrix,
    first_open_leg: &BranchAdmittanceMatrix,
    second_open_leg: &BranchAdmittanceMatrix,
) -> (Complex64, Complex64) {
    let ysh1 = link_data::kron_antenna(
        first_open_leg.y11,
        first_open_leg.y12,
        first_open_leg.y21,
        first_open_leg.y22,
        true,
    );
    let ysh2 = link_data::kron_antenna(
        second_open_leg.y11,
        second_open_leg.y12,
        second_open_leg.y21,
        second_open_leg.y22,
        true,
    );

    let y22 = close_leg.y22 + ysh1 + ysh2;
    let ysh = link_data::kron_antenna(close_leg.y11, close_leg.y12, close_leg.y21, y22, false);
    let flow = link_data::flow_yshunt(ysh, u, theta);

    let v = Complex64::from_polar(u, theta);
    let v0 = (-close_leg.y21 * v) / (close_leg.y22 + ysh1 + ysh2);
    (flow, v0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const P1: f64 = 99.218431;
    const Q1: f64 = 2.7304328;
    const P2: f64 = -216.19819;
    const Q2: f64 = -85.368180;
    const P3: f64 = 118.0;
    const Q3: f64 = 92.612077;

    const U1: f64 = 412.989001;
    const ANGLE1: f64 = -6.78071;
    const U2: f64 = 224.315268;
    const ANGLE2: f64 = -8.77012;
    const U3: f64 = 21.987;
    const ANGLE3: f64 = -6.6508;

    const R1: f64 = 0.898462;
    const X1: f64 = 17.204128;
    const B11: f64 = 2.4375E-6;
    const RATED_U1: f64 = 400.0;
    const R2: f64 = 1.070770247933884;
    const X2: f64 = 19.6664;
    const RATED_U2: f64 = 220.0;
    const R3: f64 = 4.837006802721089;
    const X3: f64 = 21.76072562358277;
    const RATED_U3: f64 = 21.0;
    const RATED_U0: f64 = RATED_U1;

    const TOL: f64 = 1e-5;

    fn legs() -> [TwtLeg; 3] {
        [
            TwtLeg::new(R1, X1, 0.0, B11, RATED_U1)
                .with_voltage(U1, ANGLE1.to_radians())
                .with_flow(P1, Q1),
            TwtLeg::new(R2, X2, 0.0, 0.0, RATED_U2)
                .with_voltage(U2, ANGLE2.to_radians())
                .with_flow(P2, Q2),
            TwtLeg::new(R3, X3, 0.0, 0.0, RATED_U3)
                .with_voltage(U3, ANGLE3.to_radians())
                .with_flow(P3, Q3),
        ]
    }

    fn assert_flows(data: &TwtData, expected: [f64; 6]) {
        let actual = [
            data.computed_p(Side::One),
            data.computed_q(Side::One),
            data.computed_p(Side::Two),
            data.computed_q(Side::Two),
            data.computed_p(Side::Three),
            data.computed_q(Side::Three),
        ];
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < TOL, "expected {e}, got {a}");
        }
    }

    fn assert_star(data: &TwtData, u: f64, angle_degrees: f64) {
        assert!((data.star_u() - u).abs() < TOL);
        assert!((data.star_theta().to_degrees() - angle_degrees).abs() < TOL);
    }

    #[test]
    fn all_legs_connected() {
        let data = TwtData::new("3wt", legs(), RATED_U0, TwtParameters::default());
        assert_flows(
            &data,
            [
                99.227288294050,
                2.747147185208,
                -216.195866533486,
                -85.490493190353,
                117.988318295633,
                92.500849015581,
            ],
        );
        assert_star(&data, 412.66200701692287, -7.353686938578365);

        // Computed flows track the solved terminal flows closely.
        assert!((data.computed_p(Side::One) - data.p(Side::One)).abs() < 0.3);
        assert!((data.computed_p(Side::Three) - data.p(Side::Three)).abs() < 0.3);
    }

    #[test]
    fn split_shunt_admittance() {
        let parameters = TwtParameters {
            split_shunt_admittance: true,
            ..TwtParameters::default()
        };
        let data = TwtData::new("3wt", legs(), RATED_U0, parameters);
        assert_flows(
            &data,
            [
                99.231950, 2.876479, -216.194348, -85.558437, 117.981856, 92.439531,
            ],
        );
    }

    #[test]
    fn legs_two_and_three_connected() {
        let [leg1, leg2, leg3] = legs();
        let data = TwtData::new(
            "3wt",
            [leg1.disconnected(), leg2, leg3],
            RATED_U0,
            TwtParameters::default(),
        );
        assert_flows(
            &data,
            [
                0.0,
                0.0,
                -164.099476216398,
                -81.835885442800,
                165.291731946141,
                89.787051339157,
            ],
        );
        assert_star(&data, 412.29478568401856, -7.700275244269859);
    }

    #[test]
    fn legs_one_and_three_connected() {
        let [leg1, leg2, leg3] = legs();
        let data = TwtData::new(
            "3wt",
            [leg1, leg2.disconnected(), leg3],
            RATED_U0,
            TwtParameters::default(),
        );
        assert_flows(
            &data,
            [
                -18.723067158829,
                -59.239225729782,
                0.0,
                0.0,
                18.851212571411,
                59.694062940578,
            ],
        );
        assert_star(&data, 415.4806896701992, -6.690799426080698);
    }

    #[test]
    fn legs_one_and_two_connected() {
        let [leg1, leg2, leg3] = legs();
        let data = TwtData::new(
            "3wt",
            [leg1, leg2, leg3.disconnected()],
            RATED_U0,
            TwtParameters::default(),
        );
        assert_flows(
            &data,
            [
                161.351352526949,
                51.327798049323,
                -161.019856627996,
                -45.536840365345,
                0.0,
                0.0,
            ],
        );
        assert_star(&data, 410.53566804098494, -7.703116461849692);
    }

    #[test]
    fn only_leg_one_connected() {
        let [leg1, leg2, leg3] = legs();
        let data = TwtData::new(
            "3wt",
            [leg1, leg2.disconnected(), leg3.disconnected()],
            RATED_U0,
            TwtParameters::default(),
        );
        assert_flows(&data, [0.0, -0.415739792683, 0.0, 0.0, 0.0, 0.0]);
        assert_star(&data, 412.9890009999999, -6.78071);
    }

    #[test]
    fn only_leg_two_connected() {
        let [leg1, leg2, leg3] = legs();
        let data = TwtData::new(
            "3wt",
            [leg1.disconnected(), leg2, leg3.disconnected()],
            RATED_U0,
            TwtParameters::default(),
        );
        assert_flows(
            &data,
            [0.0, 0.0, 0.000001946510, -0.405486077928, 0.0, 0.0],
        );
        assert_star(&data, 407.8654944214268, -8.77026956158324);
    }

    #[test]
    fn only_leg_three_connected() {
        let [leg1, leg2, leg3] = legs();
        let data = TwtData::new(
            "3wt",
            [leg1.disconnected(), leg2.disconnected(), leg3],
            RATED_U0,
            TwtParameters::default(),
        );
        assert_flows(
            &data,
            [0.0, 0.0, 0.0, 0.0, 0.000005977974, -0.427562118410],
        );
        assert_star(&data, 418.82221596280823, -6.65147559975559);
    }

    #[test]
    fn all_legs_disconnected() {
        let [leg1, leg2, leg3] = legs();
        let data = TwtData::new(
            "3wt",
            [
                leg1.disconnected(),
                leg2.disconnected(),
                leg3.disconnected(),
            ],
            RATED_U0,
            TwtParameters::default(),
        );
        for side in [Side::One, Side::Two, Side::Three] {
            assert!(data.computed_p(side).is_nan());
            assert!(data.computed_q(side).is_nan());
        }
        assert!(data.star_u().is_nan());
        assert!(data.star_theta().is_nan());
    }

    #[test]
    fn side_accessors_report_inputs() {
        let data = TwtData::new("3wt", legs(), RATED_U0, TwtParameters::default());
        assert_eq!(data.id(), "3wt");
        assert_eq!(data.r(Side::One), R1);
        assert_eq!(data.x(Side::Two), X2);
        assert_eq!(data.b1(Side::One), B11);
        assert_eq!(data.b2(Side::One), 0.0);
        assert_eq!(data.rated_u(Side::Three), RATED_U3);
        assert_eq!(data.rated_u0(), RATED_U0);
        assert_eq!(data.u(Side::One), U1);
        assert_eq!(data.p(Side::Two), P2);
        assert!(data.is_connected(Side::One));
        assert!(data.is_main_component(Side::One));
        assert_eq!(data.phase_angle_clock2(), 0);
    }

    #[test]
    fn tap_steps_scale_impedance_and_ratio() {
        // A 5% reactance correction and a 1.05 ratio step on leg 2.
        let [leg1, leg2, leg3] = legs();
        let step = TapStep {
            rho: 1.05,
            alpha: 0.0,
            r: 0.0,
            x: 5.0,
            g: 0.0,
            b: 0.0,
        };
        let data = TwtData::new(
            "3wt",
            [leg1, leg2.with_ratio_step(step), leg3],
            RATED_U0,
            TwtParameters::default(),
        );
        assert!((data.x(Side::Two) - X2 * 1.05).abs() < 1e-12);
        // rho2 = ratedU0 / ratedU2 * 1.05 feeds the admittance; the corrected
        // reactance changes the computed flows.
        assert!((data.computed_p(Side::Two) - (-216.195866533486)).abs() > TOL);
    }

    #[test]
    fn reactance_correction_applies_epsilon() {
        let [mut leg1, leg2, leg3] = legs();
        leg1.x = 0.01;
        let parameters = TwtParameters {
            epsilon_x: 0.1,
            apply_reactance_correction: true,
            ..TwtParameters::default()
        };
        let data = TwtData::new("3wt", [leg1, leg2, leg3], RATED_U0, parameters);
        assert_eq!(data.x(Side::One), 0.1);
    }
}
