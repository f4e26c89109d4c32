//! Tree construction: index assignment, structural errors and finalize.

use approx::assert_relative_eq;
use nalgebra::Vector3;
use sim_multibody::{
    BodyIndex, FrameAnchor, FrameIndex, MobilizerIndex, MultibodyError, MultibodyTree, Pose,
    SpatialInertia, UnitInertia,
};

use super::fixtures::Acrobot;

fn unit_body() -> SpatialInertia<f64> {
    SpatialInertia::new(1.0, Vector3::zeros(), UnitInertia::solid_sphere(0.1))
}

fn body_frame(tree: &MultibodyTree, body: BodyIndex) -> FrameIndex {
    tree.body(body).unwrap().body_frame_index()
}

/// Test: finalize flips validity once; a second finalize fails.
#[test]
fn finalize_once() {
    let mut tree = MultibodyTree::<f64>::new();
    let body = tree.add_body(unit_body()).unwrap();
    let frame = body_frame(&tree, body);
    tree.add_revolute_mobilizer(FrameIndex::WORLD, frame, Vector3::z())
        .unwrap();

    assert!(!tree.topology_is_valid());
    tree.finalize().unwrap();
    assert!(tree.topology_is_valid());

    let err = tree.finalize().unwrap_err();
    assert!(matches!(err, MultibodyError::AlreadyFinalized { .. }));
    assert!(err.is_structural());
}

/// Test: every structural operation fails after finalize and leaves the tree
/// unchanged.
#[test]
fn structural_operations_rejected_after_finalize() {
    let mut acrobot = Acrobot::new();
    let tree = &mut acrobot.tree;
    let before = tree.topology().clone();

    assert!(tree.add_body(unit_body()).unwrap_err().is_structural());
    assert!(
        tree.add_frame(acrobot.upper, Pose::identity())
            .unwrap_err()
            .is_structural()
    );
    let lower_frame = body_frame(tree, acrobot.lower);
    assert!(
        tree.add_revolute_mobilizer(FrameIndex::WORLD, lower_frame, Vector3::z())
            .unwrap_err()
            .is_structural()
    );

    assert_eq!(tree.topology(), &before);
    assert_eq!(tree.num_bodies(), 3);
    assert_eq!(tree.num_frames(), 5);
    assert_eq!(tree.num_mobilizers(), 2);
}

/// Test: the n-th element of each kind gets index n-1 regardless of
/// interleaving.
#[test]
fn indices_follow_creation_order() {
    let mut tree = MultibodyTree::<f64>::new();
    let a = tree.add_body(unit_body()).unwrap();
    let a_tip = tree
        .add_frame(a, Pose::from_translation(Vector3::x()))
        .unwrap();
    let m0 = tree
        .add_revolute_mobilizer(FrameIndex::WORLD, body_frame(&tree, a), Vector3::z())
        .unwrap();
    let b = tree.add_body(unit_body()).unwrap();
    let m1 = tree
        .add_prismatic_mobilizer(a_tip, body_frame(&tree, b), Vector3::x())
        .unwrap();
    let b_tip = tree
        .add_frame(FrameAnchor::Frame(body_frame(&tree, b)), Pose::identity())
        .unwrap();

    assert_eq!((a, b), (BodyIndex(1), BodyIndex(2)));
    assert_eq!(body_frame(&tree, a), FrameIndex(1));
    assert_eq!(a_tip, FrameIndex(2));
    assert_eq!(body_frame(&tree, b), FrameIndex(3));
    assert_eq!(b_tip, FrameIndex(4));
    assert_eq!((m0, m1), (MobilizerIndex(0), MobilizerIndex(1)));
}

/// Test: context creation requires a finalized tree and sizes the state from
/// the mobilizers.
#[test]
fn context_requires_finalize() {
    let mut tree = MultibodyTree::<f64>::new();
    let body = tree.add_body(unit_body()).unwrap();
    tree.add_revolute_mobilizer(FrameIndex::WORLD, body_frame(&tree, body), Vector3::z())
        .unwrap();

    let err = tree.create_default_context().unwrap_err();
    assert!(matches!(err, MultibodyError::NotFinalized { .. }));
    assert!(err.is_precondition());
    assert!(tree.create_position_kinematics_cache().is_err());

    tree.finalize().unwrap();
    let context = tree.create_default_context().unwrap();
    assert_eq!(context.num_positions(), tree.num_positions());
    assert_eq!(context.num_velocities(), tree.num_velocities());
    assert!(context.positions().iter().all(|q| *q == 0.0));
}

/// Test: a second inboard mobilizer for the same body is rejected and the
/// tree is unchanged.
#[test]
fn multiple_inboard_mobilizers_rejected() {
    let mut tree = MultibodyTree::<f64>::new();
    let a = tree.add_body(unit_body()).unwrap();
    let b = tree.add_body(unit_body()).unwrap();
    tree.add_revolute_mobilizer(FrameIndex::WORLD, body_frame(&tree, b), Vector3::z())
        .unwrap();
    let before = tree.topology().clone();

    let err = tree
        .add_revolute_mobilizer(body_frame(&tree, a), body_frame(&tree, b), Vector3::z())
        .unwrap_err();
    assert_eq!(err, MultibodyError::MultipleInboardMobilizers { body: b.0 });
    assert_eq!(tree.topology(), &before);
    assert_eq!(tree.num_mobilizers(), 1);
}

/// Test: a mobilizer closing a loop is rejected.
#[test]
fn cycle_rejected() {
    let mut tree = MultibodyTree::<f64>::new();
    let a = tree.add_body(unit_body()).unwrap();
    let b = tree.add_body(unit_body()).unwrap();
    tree.add_revolute_mobilizer(body_frame(&tree, a), body_frame(&tree, b), Vector3::z())
        .unwrap();
    let before = tree.topology().clone();

    let err = tree
        .add_revolute_mobilizer(body_frame(&tree, b), body_frame(&tree, a), Vector3::z())
        .unwrap_err();
    assert_eq!(
        err,
        MultibodyError::CycleDetected {
            inboard: b.0,
            outboard: a.0,
        }
    );
    assert!(err.is_structural());
    assert_eq!(tree.topology(), &before);
}

/// Test: degenerate connections are rejected.
#[test]
fn degenerate_connections_rejected() {
    let mut tree = MultibodyTree::<f64>::new();
    let a = tree.add_body(unit_body()).unwrap();
    let a_tip = tree
        .add_frame(a, Pose::from_translation(Vector3::y()))
        .unwrap();

    let err = tree
        .add_revolute_mobilizer(a_tip, body_frame(&tree, a), Vector3::z())
        .unwrap_err();
    assert_eq!(err, MultibodyError::SelfConnection { body: a.0 });

    let err = tree
        .add_revolute_mobilizer(a_tip, FrameIndex::WORLD, Vector3::z())
        .unwrap_err();
    assert_eq!(err, MultibodyError::WorldAsOutboard);

    let err = tree
        .add_revolute_mobilizer(FrameIndex(17), body_frame(&tree, a), Vector3::z())
        .unwrap_err();
    assert!(err.is_dimension());
    assert_eq!(tree.num_mobilizers(), 0);
}

/// Test: a zero axis is rejected without registering the mobilizer.
#[test]
fn zero_axis_rejected() {
    let mut tree = MultibodyTree::<f64>::new();
    let a = tree.add_body(unit_body()).unwrap();
    let before = tree.topology().clone();

    let err = tree
        .add_revolute_mobilizer(FrameIndex::WORLD, body_frame(&tree, a), Vector3::zeros())
        .unwrap_err();
    assert!(matches!(err, MultibodyError::InvalidParameter { .. }));
    assert_eq!(tree.topology(), &before);
    assert_eq!(tree.num_mobilizers(), 0);
}

/// Test: a non-unit axis is normalized.
#[test]
fn axis_normalized() {
    let mut tree = MultibodyTree::<f64>::new();
    let a = tree.add_body(unit_body()).unwrap();
    let m = tree
        .add_revolute_mobilizer(
            FrameIndex::WORLD,
            body_frame(&tree, a),
            Vector3::new(0.0, 0.0, 3.0),
        )
        .unwrap();
    let axis = tree.revolute_mobilizer(m).unwrap().axis();
    assert_eq!(*axis, Vector3::z());
}

/// Test: negative mass is rejected.
#[test]
fn negative_mass_rejected() {
    let mut tree = MultibodyTree::<f64>::new();
    let err = tree
        .add_body(SpatialInertia::new(
            -1.0,
            Vector3::zeros(),
            UnitInertia::solid_sphere(0.1),
        ))
        .unwrap_err();
    assert!(matches!(err, MultibodyError::InvalidParameter { .. }));
    assert_eq!(tree.num_bodies(), 1);
}

/// Test: a body without an inboard mobilizer cannot be finalized.
#[test]
fn disconnected_body_rejected() {
    let mut tree = MultibodyTree::<f64>::new();
    let a = tree.add_body(unit_body()).unwrap();
    let b = tree.add_body(unit_body()).unwrap();
    tree.add_revolute_mobilizer(FrameIndex::WORLD, body_frame(&tree, a), Vector3::z())
        .unwrap();

    let err = tree.finalize().unwrap_err();
    assert_eq!(err, MultibodyError::DisconnectedBody { body: b.0 });
    assert!(!tree.topology_is_valid());
    assert!(tree.body_node_index(b).is_err());
}

/// Test: frames anchored on frames compose their offsets.
#[test]
fn frame_anchor_chain() {
    let mut tree = MultibodyTree::<f64>::new();
    let a = tree.add_body(unit_body()).unwrap();
    let f1 = tree
        .add_frame(a, Pose::from_translation(Vector3::new(1.0, 0.0, 0.0)))
        .unwrap();
    let f2 = tree
        .add_frame(f1, Pose::from_translation(Vector3::new(0.0, 2.0, 0.0)))
        .unwrap();

    let frame = tree.frame(f2).unwrap();
    assert_eq!(frame.body(), a);
    assert_eq!(frame.pose_in_body().translation, Vector3::new(1.0, 2.0, 0.0));
}

/// Test: typed accessors refuse the wrong mobilizer kind and out-of-range
/// indices.
#[test]
fn typed_accessors() {
    let mut tree = MultibodyTree::<f64>::new();
    let a = tree.add_body(unit_body()).unwrap();
    let slider = tree
        .add_prismatic_mobilizer(FrameIndex::WORLD, body_frame(&tree, a), Vector3::x())
        .unwrap();

    assert!(tree.prismatic_mobilizer(slider).is_ok());
    let err = tree.revolute_mobilizer(slider).unwrap_err();
    assert_eq!(
        err,
        MultibodyError::MobilizerKindMismatch {
            index: 0,
            expected: "revolute",
        }
    );
    assert!(tree.body(BodyIndex(9)).unwrap_err().is_dimension());
    assert!(tree.mobilizer(MobilizerIndex(3)).unwrap_err().is_dimension());
}

/// Test: a slider moves its body along the axis.
#[test]
fn prismatic_kinematics() {
    let mut tree = MultibodyTree::<f64>::new();
    let a = tree.add_body(unit_body()).unwrap();
    let slider = tree
        .add_prismatic_mobilizer(FrameIndex::WORLD, body_frame(&tree, a), Vector3::x())
        .unwrap();
    tree.finalize().unwrap();

    let mut context = tree.create_default_context().unwrap();
    let mobilizer = tree.prismatic_mobilizer(slider).unwrap();
    mobilizer
        .set_translation(&mut context, 0.75)
        .and_then(|m| m.set_translation_rate(&mut context, -2.0))
        .unwrap();
    assert_eq!(mobilizer.translation(&context).unwrap(), 0.75);

    let mut pc = tree.create_position_kinematics_cache().unwrap();
    let mut vc = tree.create_velocity_kinematics_cache().unwrap();
    tree.calc_position_kinematics_cache(&context, &mut pc).unwrap();
    tree.calc_velocity_kinematics_cache(&context, &pc, &mut vc).unwrap();

    let node = tree.body_node_index(a).unwrap();
    assert_eq!(pc.x_wb(node).unwrap().translation, Vector3::new(0.75, 0.0, 0.0));
    assert_eq!(vc.v_wb(node).unwrap().translational, Vector3::new(-2.0, 0.0, 0.0));

    // Unit mass.
    let m = tree.calc_mass_matrix_via_inverse_dynamics(&context).unwrap();
    assert_relative_eq!(m[(0, 0)], 1.0, epsilon = 1e-15);
}

/// Test: a context or cache from another tree is rejected.
#[test]
fn foreign_state_rejected() {
    let first = Acrobot::new();
    let second = Acrobot::new();
    assert_ne!(first.tree.tree_id(), second.tree.tree_id());

    let mut foreign_context = second.tree.create_default_context().unwrap();
    let shoulder = first.tree.revolute_mobilizer(first.shoulder).unwrap();
    let err = shoulder.set_angle(&mut foreign_context, 1.0).unwrap_err();
    assert!(err.is_precondition());
    assert!(first.tree.calc_bias_term(&foreign_context).unwrap_err().is_precondition());

    let context = first.tree.create_default_context().unwrap();
    let mut foreign_cache = second.tree.create_position_kinematics_cache().unwrap();
    let err = first
        .tree
        .calc_position_kinematics_cache(&context, &mut foreign_cache)
        .unwrap_err();
    assert!(matches!(err, MultibodyError::TopologyMismatch { .. }));
}
