//! Six-DOF arm tracking a moving target under barrier constraints.
//!
//! Drives the end effector after a sinusoidally moving target while two
//! control barrier functions stay satisfied: a Cartesian cap on the tool's
//! y coordinate and the model's joint limits. Publishes poses to an
//! optional TCP viewer, fire-and-forget.
//!
//! Run: `cargo run -p gantry-demos --bin arm_tracking -- --duration 10`

use std::path::PathBuf;

use clap::Parser;

use gantry_barriers::{Barrier, ConfigurationBarrier, PositionBarrier};
use gantry_core::{ControlConfig, RateLimiter};
use gantry_demos::{arm_reference_posture, SIX_DOF_ARM_URDF};
use gantry_kinematics::{Configuration, KinematicTree, RootJoint};
use gantry_solver::{solve_ik, SolverConfig};
use gantry_tasks::{FrameTask, PostureTask, Task};
use gantry_viz::VizClient;

/// Barrier-constrained target tracking on a six-DOF arm.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// TCP address of a visualization listener (e.g. 127.0.0.1:7010).
    #[arg(long)]
    viz: Option<String>,

    /// Control rate in Hz.
    #[arg(long, default_value_t = 200.0)]
    frequency: f64,

    /// Run duration in seconds (default: run forever).
    #[arg(long)]
    duration: Option<f64>,

    /// QP backend name.
    #[arg(long, default_value = "clarabel")]
    solver: String,

    /// TOML control config; overrides the flags above.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Robot URDF path (default: the embedded six-DOF arm).
    #[arg(long)]
    urdf: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    println!("=== Arm target tracking under CBF constraints ===\n");

    // 1. Control configuration
    let control = match &cli.config {
        Some(path) => ControlConfig::from_file(path)
            .unwrap_or_else(|e| panic!("failed to load config {}: {e}", path.display())),
        None => ControlConfig {
            frequency: cli.frequency,
            backend: cli.solver.clone(),
            ..ControlConfig::default()
        },
    };
    control.validate().expect("invalid control configuration");
    let solver_config =
        SolverConfig::from_control(&control).expect("invalid solver configuration");

    // 2. Robot model
    let model = match &cli.urdf {
        Some(path) => gantry_model::parse_file(path).unwrap_or_else(|e| {
            panic!(
                "failed to load {}: {e}\n\
                 hint: pass --urdf an existing URDF file, or omit the flag \
                 to use the embedded six-DOF arm",
                path.display()
            )
        }),
        None => gantry_model::parse_string(SIX_DOF_ARM_URDF).expect("embedded URDF parses"),
    };

    let tree = KinematicTree::from_model(&model, RootJoint::Fixed)
        .expect("failed to build kinematic tree");
    let q_ref = arm_reference_posture();
    let mut configuration =
        Configuration::new(tree.clone(), q_ref.clone()).expect("reference posture fits model");

    println!("robot: {} ({} DOF)", model.name, tree.nv());
    println!("joints: {:?}", tree.joint_names());

    // 3. Tasks: reach the target frame, stay near the reference posture.
    let mut end_effector_task = FrameTask::new("ee_link", 50.0, 1.0).with_lm_damping(1e-4);
    end_effector_task
        .set_target_from_configuration(&configuration)
        .expect("ee_link exists");
    let mut posture_task = PostureTask::new(1e-3);
    posture_task.set_target(q_ref);

    // 4. Barriers: cap tool y at 0.6 m, keep joints inside their limits.
    let position_cbf = PositionBarrier::new("ee_link")
        .with_indices(&[1])
        .with_max(&[0.6])
        .with_gain(100.0)
        .with_safe_radius(1.0);
    let configuration_cbf = ConfigurationBarrier::new(&tree)
        .with_gain(1.0)
        .with_safe_radius(100.0);

    println!("barriers: {position_cbf}");
    println!("          {configuration_cbf}\n");

    // 5. Visualization (optional, fire-and-forget)
    let mut viz = match &cli.viz {
        Some(addr) => match VizClient::connect(addr) {
            Ok(client) => {
                println!("viz: connected to {addr}");
                client
            }
            Err(e) => {
                eprintln!("viz: connection to {addr} failed ({e}), running blind");
                VizClient::disconnected()
            }
        },
        None => VizClient::disconnected(),
    };
    viz.frame("end_effector_target");
    viz.frame("end_effector");
    viz.display(configuration.q());

    // 6. Control loop
    let mut rate = RateLimiter::new(control.frequency);
    let dt = rate.period();
    let mut t = 0.0_f64;
    let mut step = 0_u64;

    loop {
        if let Some(duration) = cli.duration {
            if t >= duration {
                break;
            }
        }

        // Update the target: sine sweep along y, fixed height.
        let mut target = end_effector_task.target().expect("target was set");
        target.translation.y = 0.7 * (t / 2.0).sin();
        target.translation.z = 0.2;
        end_effector_task.set_target(target);

        viz.set_transform("end_effector_target", &target);
        let ee_pose = configuration
            .transform_frame_to_world("ee_link")
            .expect("ee_link exists");
        viz.set_transform("end_effector", &ee_pose);

        // Velocity command and integration.
        let velocity = solve_ik(
            &configuration,
            &[&end_effector_task, &posture_task],
            &[&position_cbf, &configuration_cbf],
            dt,
            &solver_config,
        )
        .unwrap_or_else(|e| {
            eprintln!("solve failed at t={t:.3}s: {e}");
            std::process::exit(1);
        });
        configuration
            .integrate_inplace(&velocity, dt)
            .expect("velocity has solver dimensions");

        if step % 50 == 0 {
            let task_error = end_effector_task
                .compute_error(&configuration)
                .expect("task evaluates")
                .norm();
            let position_margin = position_cbf
                .compute_barrier(&configuration)
                .expect("barrier evaluates")[0];
            println!(
                "t={t:7.3}s  task error {task_error:.4}  position CBF {position_margin:+.3} >= 0  \
                 tool y {:.3} <= 0.6",
                ee_pose.translation.y
            );
        }

        viz.display(configuration.q());
        rate.sleep();
        t += dt;
        step += 1;
    }

    println!("\ndone after {step} steps ({t:.2}s simulated)");
}
