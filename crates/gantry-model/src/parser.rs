//! URDF XML parsing using `urdf-rs`.
//!
//! Converts `urdf_rs` types into the crate's canonical [`RobotModel`]
//! representation, keeping only the structural data the kinematics layer
//! consumes.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::ModelError;
use crate::types::{JointData, JointLimits, JointType, LinkData, Origin, RobotModel};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a URDF file from disk into a [`RobotModel`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<RobotModel, ModelError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_string(&content)
}

/// Parse a URDF XML string into a [`RobotModel`].
pub fn parse_string(xml: &str) -> Result<RobotModel, ModelError> {
    let robot = urdf_rs::read_from_string(xml).map_err(|e| ModelError::Parse(e.to_string()))?;
    convert_robot(&robot)
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

fn convert_robot(robot: &urdf_rs::Robot) -> Result<RobotModel, ModelError> {
    let links: HashMap<String, LinkData> = robot
        .links
        .iter()
        .map(|l| (l.name.clone(), LinkData::new(&l.name)))
        .collect();

    let joints: HashMap<String, JointData> = robot
        .joints
        .iter()
        .map(|j| convert_joint(j).map(|jd| (jd.name.clone(), jd)))
        .collect::<Result<_, _>>()?;

    // Root link = a link that is never a child of any joint.
    let child_links: HashSet<&str> = joints.values().map(|j| j.child.as_str()).collect();
    let root_link = links
        .keys()
        .find(|name| !child_links.contains(name.as_str()))
        .ok_or(ModelError::NoRootLink)?
        .clone();

    Ok(RobotModel {
        name: robot.name.clone(),
        links,
        joints,
        root_link,
    })
}

fn convert_joint(joint: &urdf_rs::Joint) -> Result<JointData, ModelError> {
    let joint_type = convert_joint_type(&joint.joint_type)?;

    Ok(JointData {
        name: joint.name.clone(),
        joint_type,
        parent: joint.parent.link.clone(),
        child: joint.child.link.clone(),
        origin: Origin {
            xyz: joint.origin.xyz.0,
            rpy: joint.origin.rpy.0,
        },
        axis: joint.axis.xyz.0,
        limits: convert_limits(&joint.limit),
    })
}

fn convert_joint_type(jt: &urdf_rs::JointType) -> Result<JointType, ModelError> {
    match jt {
        urdf_rs::JointType::Revolute => Ok(JointType::Revolute),
        urdf_rs::JointType::Continuous => Ok(JointType::Continuous),
        urdf_rs::JointType::Prismatic => Ok(JointType::Prismatic),
        urdf_rs::JointType::Fixed => Ok(JointType::Fixed),
        urdf_rs::JointType::Floating => Ok(JointType::Floating),
        urdf_rs::JointType::Planar => Ok(JointType::Planar),
        urdf_rs::JointType::Spherical => Err(ModelError::UnsupportedJointType("spherical".into())),
    }
}

fn convert_limits(limit: &urdf_rs::JointLimit) -> JointLimits {
    // urdf-rs defaults lower/upper to 0.0 for joints without limits.
    // Both-zero is read as "no position limits".
    let has_limits = (limit.lower - limit.upper).abs() > f64::EPSILON;
    JointLimits {
        lower: has_limits.then_some(limit.lower),
        upper: has_limits.then_some(limit.upper),
        effort: limit.effort,
        velocity: limit.velocity,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_URDF: &str = r#"
        <robot name="test_robot">
            <link name="base_link"/>
        </robot>
    "#;

    const TWO_LINK_URDF: &str = r#"
        <robot name="two_link">
            <link name="base_link"/>
            <link name="child_link"/>
            <joint name="joint1" type="revolute">
                <parent link="base_link"/>
                <child link="child_link"/>
                <origin xyz="0 0 0.5" rpy="0 0 0"/>
                <axis xyz="0 0 1"/>
                <limit lower="-1.57" upper="1.57" effort="100" velocity="5"/>
            </joint>
        </robot>
    "#;

    const MULTI_JOINT_URDF: &str = r#"
        <robot name="arm">
            <link name="base"/>
            <link name="link1"/>
            <link name="link2"/>
            <link name="link3"/>
            <joint name="joint1" type="revolute">
                <parent link="base"/>
                <child link="link1"/>
                <axis xyz="0 0 1"/>
                <limit lower="-3.14" upper="3.14" effort="50" velocity="2"/>
            </joint>
            <joint name="joint2" type="continuous">
                <parent link="link1"/>
                <child link="link2"/>
                <axis xyz="0 1 0"/>
            </joint>
            <joint name="fixed_end" type="fixed">
                <parent link="link2"/>
                <child link="link3"/>
            </joint>
        </robot>
    "#;

    // -- parse_string --

    #[test]
    fn parse_minimal_urdf() {
        let model = parse_string(MINIMAL_URDF).unwrap();
        assert_eq!(model.name, "test_robot");
        assert_eq!(model.links.len(), 1);
        assert!(model.joints.is_empty());
        assert_eq!(model.root_link, "base_link");
    }

    #[test]
    fn parse_two_link_robot() {
        let model = parse_string(TWO_LINK_URDF).unwrap();
        assert_eq!(model.name, "two_link");
        assert_eq!(model.links.len(), 2);
        assert_eq!(model.joints.len(), 1);
        assert_eq!(model.root_link, "base_link");
    }

    #[test]
    fn parse_multi_joint_robot() {
        let model = parse_string(MULTI_JOINT_URDF).unwrap();
        assert_eq!(model.name, "arm");
        assert_eq!(model.links.len(), 4);
        assert_eq!(model.joints.len(), 3);
        assert_eq!(model.dof(), 2); // revolute + continuous, not fixed
        assert_eq!(model.root_link, "base");
    }

    // -- Joint data --

    #[test]
    fn joint_type_parsed_correctly() {
        let model = parse_string(MULTI_JOINT_URDF).unwrap();
        assert_eq!(
            model.joint("joint1").unwrap().joint_type,
            JointType::Revolute
        );
        assert_eq!(
            model.joint("joint2").unwrap().joint_type,
            JointType::Continuous
        );
        assert_eq!(
            model.joint("fixed_end").unwrap().joint_type,
            JointType::Fixed
        );
    }

    #[test]
    fn joint_limits_parsed() {
        let model = parse_string(TWO_LINK_URDF).unwrap();
        let lim = &model.joint("joint1").unwrap().limits;
        assert!((lim.lower.unwrap() - (-1.57)).abs() < 1e-9);
        assert!((lim.upper.unwrap() - 1.57).abs() < 1e-9);
        assert!((lim.effort - 100.0).abs() < f64::EPSILON);
        assert!((lim.velocity - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn joint_axis_parsed() {
        let model = parse_string(TWO_LINK_URDF).unwrap();
        let joint = model.joint("joint1").unwrap();
        assert!((joint.axis[2] - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn joint_origin_parsed() {
        let model = parse_string(TWO_LINK_URDF).unwrap();
        let joint = model.joint("joint1").unwrap();
        assert!((joint.origin.xyz[2] - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn joint_parent_child() {
        let model = parse_string(TWO_LINK_URDF).unwrap();
        let joint = model.joint("joint1").unwrap();
        assert_eq!(joint.parent, "base_link");
        assert_eq!(joint.child, "child_link");
    }

    // -- Continuous joint (no position limits) --

    #[test]
    fn continuous_joint_has_no_position_limits() {
        let model = parse_string(MULTI_JOINT_URDF).unwrap();
        let joint = model.joint("joint2").unwrap();
        assert!(joint.limits.lower.is_none());
        assert!(joint.limits.upper.is_none());
    }

    // -- Error cases --

    #[test]
    fn parse_invalid_xml() {
        assert!(parse_string("<not valid urdf>").is_err());
    }

    #[test]
    fn parse_file_not_found() {
        let err = parse_file("/nonexistent/robot.urdf").unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }
}
