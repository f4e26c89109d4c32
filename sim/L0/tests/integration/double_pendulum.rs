//! Acrobot scenario: kinematics and dynamics against closed-form references.

use std::f64::consts::{FRAC_PI_3, FRAC_PI_4};

use nalgebra::{DVector, Vector3};
use sim_multibody::{
    BodyIndex, BodyNodeIndex, FrameIndex, InverseDynamicsOutput, MobilizerIndex, SpatialForce,
};

use super::fixtures::{
    Acrobot, assert_near, bias_term, gravity_term, lower_pose, lower_velocity, mass_matrix,
    upper_pose, upper_velocity,
};

const EPS: f64 = f64::EPSILON;
const ANGLES: [f64; 2] = [FRAC_PI_3, FRAC_PI_4];
const RATES: [f64; 2] = [1.3, -0.7];

/// Test: element indices follow creation order, with body frames sharing the
/// frame counter.
#[test]
fn element_indices_and_counts() {
    let acrobot = Acrobot::new();
    let tree = &acrobot.tree;

    assert_eq!(tree.num_bodies(), 3);
    assert_eq!(tree.num_frames(), 5);
    assert_eq!(tree.num_mobilizers(), 2);
    assert_eq!(tree.num_positions(), 2);
    assert_eq!(tree.num_velocities(), 2);

    assert_eq!(tree.world_body().index(), BodyIndex(0));
    assert_eq!(tree.world_frame().index(), FrameIndex(0));
    assert_eq!(acrobot.upper, BodyIndex(1));
    assert_eq!(acrobot.lower, BodyIndex(2));
    assert_eq!(tree.body(acrobot.upper).unwrap().body_frame_index(), FrameIndex(1));
    assert_eq!(tree.body(acrobot.lower).unwrap().body_frame_index(), FrameIndex(2));
    assert_eq!(acrobot.shoulder_outboard, FrameIndex(3));
    assert_eq!(acrobot.elbow_inboard, FrameIndex(4));
    assert_eq!(acrobot.shoulder, MobilizerIndex(0));
    assert_eq!(acrobot.elbow, MobilizerIndex(1));

    let elbow = tree.mobilizer(acrobot.elbow).unwrap();
    assert_eq!(elbow.inboard_frame(), FrameIndex(4));
    assert_eq!(elbow.outboard_frame(), FrameIndex(2));
    assert_eq!(elbow.topology().inboard_body, acrobot.upper);
    assert_eq!(elbow.topology().outboard_body, acrobot.lower);
    assert_eq!(tree.frame(FrameIndex(4)).unwrap().body(), acrobot.upper);

    assert_eq!(tree.body_node_index(acrobot.upper).unwrap(), BodyNodeIndex(1));
    assert_eq!(tree.body_node_index(acrobot.lower).unwrap(), BodyNodeIndex(2));
    assert_eq!(tree.topology().tree_height(), 3);
}

/// Test: coordinates are laid out root first.
#[test]
fn coordinate_layout() {
    let acrobot = Acrobot::new();
    let shoulder = acrobot.tree.mobilizer(acrobot.shoulder).unwrap().topology();
    let elbow = acrobot.tree.mobilizer(acrobot.elbow).unwrap().topology();
    assert_eq!(shoulder.positions_start, 0);
    assert_eq!(shoulder.velocities_start, 0);
    assert_eq!(elbow.positions_start, 1);
    assert_eq!(elbow.velocities_start, 1);
}

/// Test: setting an angle and reading it back returns the exact value.
#[test]
fn angle_round_trip() {
    let acrobot = Acrobot::new();
    let mut context = acrobot.tree.create_default_context().unwrap();
    assert_eq!(context.positions().len(), 2);
    assert_eq!(context.velocities().len(), 2);

    let elbow = acrobot.tree.revolute_mobilizer(acrobot.elbow).unwrap();
    elbow.set_angle(&mut context, 0.123_456_789).unwrap();
    assert_eq!(elbow.angle(&context).unwrap(), 0.123_456_789);
    assert_eq!(context.positions()[1], 0.123_456_789);
    assert_eq!(context.positions()[0], 0.0);

    elbow.set_angular_rate(&mut context, -4.5).unwrap();
    assert_eq!(elbow.angular_rate(&context).unwrap(), -4.5);

    elbow.set_zero_configuration(&mut context).unwrap();
    assert_eq!(elbow.angle(&context).unwrap(), 0.0);
}

/// Test: world poses match the closed form within 5 epsilon.
#[test]
fn world_poses() {
    let acrobot = Acrobot::new();
    let tree = &acrobot.tree;
    let p = &acrobot.params;
    let context = acrobot.context(ANGLES, RATES);

    let mut pc = tree.create_position_kinematics_cache().unwrap();
    tree.calc_position_kinematics_cache(&context, &mut pc).unwrap();

    let upper = tree.body_node_index(acrobot.upper).unwrap();
    let lower = tree.body_node_index(acrobot.lower).unwrap();
    let x_wu = pc.x_wb(upper).unwrap().to_homogeneous();
    let x_wl = pc.x_wb(lower).unwrap().to_homogeneous();

    let expected_u = upper_pose(p, ANGLES[0]).to_homogeneous();
    let expected_l = lower_pose(p, ANGLES[0], ANGLES[1]).to_homogeneous();
    assert_near(x_wu.as_slice(), expected_u.as_slice(), 5.0 * EPS, "X_WU");
    assert_near(x_wl.as_slice(), expected_l.as_slice(), 5.0 * EPS, "X_WL");

    assert!(pc.x_wb(BodyNodeIndex::WORLD).unwrap().is_exact_identity());
}

/// Test: spatial velocities match the closed form within 5 epsilon.
#[test]
fn spatial_velocities() {
    let acrobot = Acrobot::new();
    let tree = &acrobot.tree;
    let p = &acrobot.params;
    let context = acrobot.context(ANGLES, RATES);

    let mut pc = tree.create_position_kinematics_cache().unwrap();
    let mut vc = tree.create_velocity_kinematics_cache().unwrap();
    tree.calc_position_kinematics_cache(&context, &mut pc).unwrap();
    tree.calc_velocity_kinematics_cache(&context, &pc, &mut vc).unwrap();

    let upper = tree.body_node_index(acrobot.upper).unwrap();
    let lower = tree.body_node_index(acrobot.lower).unwrap();
    let v_wu = vc.v_wb(upper).unwrap().to_vector6();
    let v_wl = vc.v_wb(lower).unwrap().to_vector6();

    let expected_u = upper_velocity(p, ANGLES[0], RATES[0]).to_vector6();
    let expected_l = lower_velocity(p, ANGLES[0], RATES[0], RATES[1]).to_vector6();
    assert_near(v_wu.as_slice(), expected_u.as_slice(), 5.0 * EPS, "V_WU");
    assert_near(v_wl.as_slice(), expected_l.as_slice(), 5.0 * EPS, "V_WL");
}

/// Test: the probed mass matrix matches the closed form within 5 epsilon and
/// is symmetric.
#[test]
fn mass_matrix_matches_closed_form() {
    let acrobot = Acrobot::new();
    let context = acrobot.context(ANGLES, RATES);

    let m = acrobot
        .tree
        .calc_mass_matrix_via_inverse_dynamics(&context)
        .unwrap();
    let expected = mass_matrix(&acrobot.params, ANGLES[1]);
    assert_near(m.as_slice(), expected.as_slice(), 5.0 * EPS, "M");
    assert_near(
        m.transpose().as_slice(),
        m.as_slice(),
        5.0 * EPS,
        "M symmetry",
    );
}

/// Test: the bias term matches the closed-form Coriolis term.
#[test]
fn bias_term_matches_closed_form() {
    let acrobot = Acrobot::new();
    let context = acrobot.context(ANGLES, RATES);

    let c = acrobot.tree.calc_bias_term(&context).unwrap();
    let expected = bias_term(&acrobot.params, ANGLES[1], RATES[0], RATES[1]);
    assert_near(c.as_slice(), expected.as_slice(), 30.0 * EPS, "C v");
}

/// Test: the gravity probe matches `∂V/∂q`.
#[test]
fn gravity_term_matches_closed_form() {
    let acrobot = Acrobot::new();
    let context = acrobot.context(ANGLES, RATES);

    let g = acrobot.tree.calc_gravity_generalized_forces(&context).unwrap();
    let expected = gravity_term(&acrobot.params, ANGLES[0], ANGLES[1]);
    assert_near(g.as_slice(), expected.as_slice(), 30.0 * EPS, "G");
}

/// Test: full inverse dynamics with body weights applied equals
/// `M v̇ + C v + G` at the reference state.
#[test]
fn inverse_dynamics_matches_equations_of_motion() {
    let acrobot = Acrobot::new();
    let tree = &acrobot.tree;
    let p = &acrobot.params;
    let context = acrobot.context(ANGLES, RATES);

    let mut pc = tree.create_position_kinematics_cache().unwrap();
    let mut vc = tree.create_velocity_kinematics_cache().unwrap();
    tree.calc_position_kinematics_cache(&context, &mut pc).unwrap();
    tree.calc_velocity_kinematics_cache(&context, &pc, &mut vc).unwrap();
    let weights = tree.calc_body_weights(&pc).unwrap();

    let vdot = [0.4, -2.2];
    let mut output = InverseDynamicsOutput::new(tree.topology());
    tree.calc_inverse_dynamics(&context, &pc, &vc, &vdot, &weights, &[], &mut output)
        .unwrap();

    let expected = mass_matrix(p, ANGLES[1]) * DVector::from_column_slice(&vdot)
        + bias_term(p, ANGLES[1], RATES[0], RATES[1])
        + gravity_term(p, ANGLES[0], ANGLES[1]);
    assert_near(
        output.generalized_forces.as_slice(),
        expected.as_slice(),
        30.0 * EPS,
        "tau",
    );
}

/// Test: a force applied at the elbow produces `τ = −Jᵀ F` and no elbow torque.
#[test]
fn applied_force_maps_through_jacobian_transpose() {
    let acrobot = Acrobot::new();
    let tree = &acrobot.tree;
    let p = &acrobot.params;
    let context = acrobot.context(ANGLES, [0.0, 0.0]);

    let mut pc = tree.create_position_kinematics_cache().unwrap();
    let vc = tree.create_velocity_kinematics_cache().unwrap();
    tree.calc_position_kinematics_cache(&context, &mut pc).unwrap();

    let lower = tree.body_node_index(acrobot.lower).unwrap();
    let f = Vector3::new(2.0, -1.5, 0.0);
    let mut applied = vec![SpatialForce::zero(); tree.topology().num_body_nodes()];
    applied[lower.0] = SpatialForce::new(Vector3::zeros(), f);

    let mut output = InverseDynamicsOutput::new(tree.topology());
    tree.calc_inverse_dynamics(&context, &pc, &vc, &[0.0, 0.0], &applied, &[], &mut output)
        .unwrap();

    let (s1, c1) = ANGLES[0].sin_cos();
    let p_elbow = Vector3::new(p.l1 * s1, -p.l1 * c1, 0.0);
    let expected = [-p_elbow.cross(&f).z, 0.0];
    assert_near(
        output.generalized_forces.as_slice(),
        &expected,
        5.0 * EPS,
        "-J^T F",
    );
}

/// Test: reusing the applied arrays as outputs gives the same generalized
/// forces as distinct buffers.
#[test]
fn in_place_matches_distinct_buffers() {
    let acrobot = Acrobot::new();
    let tree = &acrobot.tree;
    let context = acrobot.context(ANGLES, RATES);

    let mut pc = tree.create_position_kinematics_cache().unwrap();
    let mut vc = tree.create_velocity_kinematics_cache().unwrap();
    tree.calc_position_kinematics_cache(&context, &mut pc).unwrap();
    tree.calc_velocity_kinematics_cache(&context, &pc, &mut vc).unwrap();

    let mut applied = tree.calc_body_weights(&pc).unwrap();
    applied[2] += SpatialForce::new(Vector3::new(0.0, 0.0, 0.3), Vector3::new(-1.0, 0.5, 0.0));
    let applied_tau = [0.25, -0.75];
    let vdot = [1.5, 0.5];

    let mut distinct = InverseDynamicsOutput::new(tree.topology());
    tree.calc_inverse_dynamics(&context, &pc, &vc, &vdot, &applied, &applied_tau, &mut distinct)
        .unwrap();

    let mut forces = applied.clone();
    let mut tau = applied_tau;
    let mut accelerations = distinct.body_accelerations.clone();
    tree.calc_inverse_dynamics_in_place(
        &context,
        &pc,
        &vc,
        &vdot,
        &mut forces,
        &mut tau,
        &mut accelerations,
    )
    .unwrap();

    assert_eq!(tau.as_slice(), distinct.generalized_forces.as_slice());
    assert_eq!(forces, distinct.transmitted_forces);
    assert_eq!(accelerations, distinct.body_accelerations);
    assert_eq!(forces[0], SpatialForce::zero());
}

/// Test: the acceleration cache agrees with the accelerations computed
/// inside inverse dynamics.
#[test]
fn acceleration_cache_matches_inverse_dynamics() {
    let acrobot = Acrobot::new();
    let tree = &acrobot.tree;
    let context = acrobot.context(ANGLES, RATES);

    let mut pc = tree.create_position_kinematics_cache().unwrap();
    let mut vc = tree.create_velocity_kinematics_cache().unwrap();
    let mut ac = tree.create_acceleration_kinematics_cache().unwrap();
    tree.calc_position_kinematics_cache(&context, &mut pc).unwrap();
    tree.calc_velocity_kinematics_cache(&context, &pc, &mut vc).unwrap();

    let vdot = [-0.3, 2.0];
    tree.calc_acceleration_kinematics_cache(&context, &pc, &vc, &vdot, &mut ac)
        .unwrap();

    let mut output = InverseDynamicsOutput::new(tree.topology());
    tree.calc_inverse_dynamics(&context, &pc, &vc, &vdot, &[], &[], &mut output)
        .unwrap();

    assert_eq!(ac.a_wb_array(), output.body_accelerations.as_slice());
}

/// Test: the upper link's acceleration is the rigid rotation about the
/// shoulder.
#[test]
fn upper_link_acceleration() {
    let acrobot = Acrobot::new();
    let tree = &acrobot.tree;
    let p = &acrobot.params;
    let context = acrobot.context(ANGLES, RATES);

    let mut pc = tree.create_position_kinematics_cache().unwrap();
    let mut vc = tree.create_velocity_kinematics_cache().unwrap();
    let mut ac = tree.create_acceleration_kinematics_cache().unwrap();
    tree.calc_position_kinematics_cache(&context, &mut pc).unwrap();
    tree.calc_velocity_kinematics_cache(&context, &pc, &mut vc).unwrap();
    let vdot = [0.8, 0.0];
    tree.calc_acceleration_kinematics_cache(&context, &pc, &vc, &vdot, &mut ac)
        .unwrap();

    // Point at distance lc1 from a fixed pivot: tangential lc1 θ̈, centripetal lc1 θ̇².
    let (s1, c1) = ANGLES[0].sin_cos();
    let tangential = Vector3::new(c1, s1, 0.0) * (p.lc1 * vdot[0]);
    let centripetal = Vector3::new(-s1, c1, 0.0) * (p.lc1 * RATES[0] * RATES[0]);
    let upper = tree.body_node_index(acrobot.upper).unwrap();
    let a_wu = ac.a_wb(upper).unwrap();
    assert_near(
        a_wu.translational.as_slice(),
        (tangential + centripetal).as_slice(),
        5.0 * EPS,
        "a_WUo",
    );
    assert_near(a_wu.rotational.as_slice(), &[0.0, 0.0, 0.8], 5.0 * EPS, "alpha_WU");
}
