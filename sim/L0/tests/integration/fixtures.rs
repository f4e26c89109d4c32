//! Shared models and closed-form references.
//!
//! The acrobot is a two-link planar chain swinging in the x-y plane about
//! world z, with gravity along -y. Angles are measured from the downward
//! vertical. The upper link's body frame sits at its center of mass; the
//! lower link's body frame sits at the elbow.

use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use sim_multibody::{
    BodyIndex, FrameIndex, Gravity, MobilizerIndex, MultibodyContext, MultibodyTree, Pose,
    SpatialInertia, SpatialVelocity, TreeConfig, UnitInertia,
};

/// Physical parameters of the acrobot.
#[derive(Debug, Clone, Copy)]
pub struct AcrobotParameters {
    pub m1: f64,
    pub m2: f64,
    pub l1: f64,
    pub l2: f64,
    pub lc1: f64,
    pub lc2: f64,
    /// Inertia of the upper link about its center of mass, perpendicular axis.
    pub ic1: f64,
    /// Inertia of the lower link about its center of mass, perpendicular axis.
    pub ic2: f64,
    pub g: f64,
}

impl Default for AcrobotParameters {
    fn default() -> Self {
        Self {
            m1: 1.0,
            m2: 1.0,
            l1: 1.0,
            l2: 2.0,
            lc1: 0.5,
            lc2: 1.0,
            ic1: 0.083,
            ic2: 0.33,
            g: 9.81,
        }
    }
}

/// Acrobot tree plus the handles the tests need.
pub struct Acrobot {
    pub tree: MultibodyTree,
    pub params: AcrobotParameters,
    pub upper: BodyIndex,
    pub lower: BodyIndex,
    pub shoulder_outboard: FrameIndex,
    pub elbow_inboard: FrameIndex,
    pub shoulder: MobilizerIndex,
    pub elbow: MobilizerIndex,
}

impl Acrobot {
    /// Build and finalize with the default parameters.
    pub fn new() -> Self {
        Self::with_parameters(AcrobotParameters::default())
    }

    /// Build and finalize.
    pub fn with_parameters(params: AcrobotParameters) -> Self {
        let gravity = Gravity::custom(Vector3::new(0.0, -params.g, 0.0));
        let mut tree = MultibodyTree::with_config(TreeConfig::with_gravity(gravity));

        let m1 = params.m1;
        let upper = tree
            .add_body(SpatialInertia::new(
                m1,
                Vector3::zeros(),
                UnitInertia::straight_line(params.ic1 / m1, &Vector3::y()),
            ))
            .expect("add upper link");

        let m2 = params.m2;
        let lower = tree
            .add_body(SpatialInertia::from_com_inertia(
                m2,
                Vector3::new(0.0, -params.lc2, 0.0),
                UnitInertia::straight_line(params.ic2 / m2, &Vector3::y()),
            ))
            .expect("add lower link");

        let shoulder_outboard = tree
            .add_frame(upper, Pose::from_translation(Vector3::new(0.0, params.lc1, 0.0)))
            .expect("add shoulder frame");
        let elbow_inboard = tree
            .add_frame(
                upper,
                Pose::from_translation(Vector3::new(0.0, params.lc1 - params.l1, 0.0)),
            )
            .expect("add elbow frame");

        let world_frame = tree.world_frame().index();
        let shoulder = tree
            .add_revolute_mobilizer(world_frame, shoulder_outboard, Vector3::z())
            .expect("add shoulder");
        let lower_frame = tree.body(lower).expect("lower").body_frame_index();
        let elbow = tree
            .add_revolute_mobilizer(elbow_inboard, lower_frame, Vector3::z())
            .expect("add elbow");
        tree.finalize().expect("finalize");

        Self {
            tree,
            params,
            upper,
            lower,
            shoulder_outboard,
            elbow_inboard,
            shoulder,
            elbow,
        }
    }

    /// Context at `(θ1, θ2)` with rates `(θ̇1, θ̇2)`, set through the mobilizers.
    pub fn context(&self, angles: [f64; 2], rates: [f64; 2]) -> MultibodyContext {
        let mut context = self.tree.create_default_context().expect("context");
        let shoulder = self.tree.revolute_mobilizer(self.shoulder).expect("shoulder");
        let elbow = self.tree.revolute_mobilizer(self.elbow).expect("elbow");
        shoulder
            .set_angle(&mut context, angles[0])
            .and_then(|m| m.set_angular_rate(&mut context, rates[0]))
            .expect("shoulder state");
        elbow
            .set_angle(&mut context, angles[1])
            .and_then(|m| m.set_angular_rate(&mut context, rates[1]))
            .expect("elbow state");
        context
    }
}

/// Rotation about z.
pub fn rotation_z(theta: f64) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

/// `X_WU` of the upper link (body frame at its center of mass).
pub fn upper_pose(p: &AcrobotParameters, theta1: f64) -> Pose<f64> {
    let (s1, c1) = theta1.sin_cos();
    Pose::new(
        rotation_z(theta1),
        Vector3::new(p.lc1 * s1, -p.lc1 * c1, 0.0),
    )
}

/// `X_WL` of the lower link (body frame at the elbow).
pub fn lower_pose(p: &AcrobotParameters, theta1: f64, theta2: f64) -> Pose<f64> {
    let (s1, c1) = theta1.sin_cos();
    Pose::new(
        rotation_z(theta1 + theta2),
        Vector3::new(p.l1 * s1, -p.l1 * c1, 0.0),
    )
}

/// `V_WU` at the upper link's body origin.
pub fn upper_velocity(p: &AcrobotParameters, theta1: f64, rate1: f64) -> SpatialVelocity<f64> {
    let (s1, c1) = theta1.sin_cos();
    SpatialVelocity::new(
        Vector3::new(0.0, 0.0, rate1),
        Vector3::new(p.lc1 * c1, p.lc1 * s1, 0.0) * rate1,
    )
}

/// `V_WL` at the elbow.
pub fn lower_velocity(
    p: &AcrobotParameters,
    theta1: f64,
    rate1: f64,
    rate2: f64,
) -> SpatialVelocity<f64> {
    let (s1, c1) = theta1.sin_cos();
    SpatialVelocity::new(
        Vector3::new(0.0, 0.0, rate1 + rate2),
        Vector3::new(p.l1 * c1, p.l1 * s1, 0.0) * rate1,
    )
}

/// Closed-form mass matrix.
pub fn mass_matrix(p: &AcrobotParameters, theta2: f64) -> DMatrix<f64> {
    let c2 = theta2.cos();
    let i1 = p.ic1 + p.m1 * p.lc1 * p.lc1;
    let i2 = p.ic2 + p.m2 * p.lc2 * p.lc2;
    let m12 = i2 + p.m2 * p.l1 * p.lc2 * c2;
    let m11 = i1 + i2 + p.m2 * p.l1 * p.l1 + 2.0 * p.m2 * p.l1 * p.lc2 * c2;
    DMatrix::from_row_slice(2, 2, &[m11, m12, m12, i2])
}

/// Closed-form Coriolis and centrifugal term `C(q, v) v`.
pub fn bias_term(p: &AcrobotParameters, theta2: f64, rate1: f64, rate2: f64) -> DVector<f64> {
    let h = p.m2 * p.l1 * p.lc2 * theta2.sin();
    DVector::from_vec(vec![
        -2.0 * h * rate1 * rate2 - h * rate2 * rate2,
        h * rate1 * rate1,
    ])
}

/// Closed-form gravity term `G(q) = ∂V/∂q`.
pub fn gravity_term(p: &AcrobotParameters, theta1: f64, theta2: f64) -> DVector<f64> {
    let s1 = theta1.sin();
    let s12 = (theta1 + theta2).sin();
    DVector::from_vec(vec![
        p.g * (p.m1 * p.lc1 * s1 + p.m2 * (p.l1 * s1 + p.lc2 * s12)),
        p.g * p.m2 * p.lc2 * s12,
    ])
}

/// Norm-relative comparison: `‖a − b‖ ≤ tol · max(‖b‖, 1)`.
pub fn assert_near(actual: &[f64], expected: &[f64], tolerance: f64, what: &str) {
    assert_eq!(actual.len(), expected.len(), "{what}: length mismatch");
    let diff: f64 = actual
        .iter()
        .zip(expected)
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt();
    let scale = expected.iter().map(|b| b * b).sum::<f64>().sqrt().max(1.0);
    assert!(
        diff <= tolerance * scale,
        "{what}: |actual - expected| = {diff:e} exceeds {:e}\n  actual:   {actual:?}\n  expected: {expected:?}",
        tolerance * scale
    );
}
