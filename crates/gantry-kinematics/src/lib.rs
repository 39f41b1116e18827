//! Kinematic tree, configuration state, and frame Jacobians.
//!
//! This crate turns a [`RobotModel`](gantry_model::RobotModel) into a
//! [`KinematicTree`] with a flat coordinate layout, and wraps it in a
//! [`Configuration`]: the joint-coordinate vector plus cached world
//! transforms for every link frame.
//!
//! # Architecture
//!
//! ```text
//! RobotModel ──► KinematicTree ──► Configuration ──► transforms / Jacobians
//! ```
//!
//! A tree is mounted on the world through a [`RootJoint`]: either welded
//! (`Fixed`) or free-floating (`FreeFlyer`, 7 position / 6 velocity
//! coordinates). Frame names are link names; the implicit world frame is
//! addressed as `"universe"`.

pub mod configuration;
pub mod error;
pub mod tree;

pub use configuration::Configuration;
pub use error::KinematicsError;
pub use tree::{BoundedDof, KinematicTree, RootJoint, WORLD_FRAME};
