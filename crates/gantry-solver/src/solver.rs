//! QP assembly and the Clarabel solve.

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT::NonnegativeConeT,
};
use log::warn;
use nalgebra::{DMatrix, DVector};

use gantry_barriers::Barrier;
use gantry_core::ControlConfig;
use gantry_kinematics::Configuration;
use gantry_tasks::Task;

use crate::backend::Backend;
use crate::error::SolveError;

// ---------------------------------------------------------------------------
// SolverConfig
// ---------------------------------------------------------------------------

/// Configuration for the velocity solve.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// QP backend.
    pub backend: Backend,
    /// Tikhonov damping added to the objective diagonal. Keeps the QP
    /// strictly convex when tasks underconstrain the velocity.
    pub damping: f64,
    /// Enforce the model's joint velocity limits as box constraints.
    pub velocity_limits: bool,
    /// Maximum interior-point iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            damping: 1e-12,
            velocity_limits: true,
            max_iterations: 200,
        }
    }
}

impl SolverConfig {
    /// Derive a solver configuration from a [`ControlConfig`].
    pub fn from_control(control: &ControlConfig) -> Result<Self, gantry_core::ConfigError> {
        Ok(Self {
            backend: control.backend.parse()?,
            damping: control.damping,
            velocity_limits: control.velocity_limits,
            ..Self::default()
        })
    }
}

// ---------------------------------------------------------------------------
// solve_ik
// ---------------------------------------------------------------------------

/// Compute a joint-velocity command tracking `tasks` subject to `barriers`.
///
/// Assembles the objective from every task's and barrier's QP contribution,
/// stacks the barrier inequalities (plus velocity-limit boxes when
/// enabled), and solves with the configured backend.
///
/// # Errors
///
/// Returns [`SolveError::Infeasible`] when no velocity satisfies the
/// constraints; the error carries the backend's terminal status. Shape
/// mismatches between contributions and the configuration are reported as
/// [`SolveError::ContributionShape`].
pub fn solve_ik(
    conf: &Configuration,
    tasks: &[&dyn Task],
    barriers: &[&dyn Barrier],
    dt: f64,
    config: &SolverConfig,
) -> Result<DVector<f64>, SolveError> {
    let nv = conf.nv();

    // 1. Objective: P = sum of task and barrier contributions + damping.
    let mut p = DMatrix::<f64>::zeros(nv, nv);
    let mut q = DVector::<f64>::zeros(nv);

    for task in tasks {
        let (h, c) = task.compute_qp_objective(conf, dt)?;
        check_shape("task objective", (nv, nv), h.shape())?;
        check_shape("task objective", (nv, 1), (c.len(), 1))?;
        p += h;
        q += c;
    }
    for barrier in barriers {
        let (h, c) = barrier.compute_qp_objective(conf)?;
        check_shape("barrier objective", (nv, nv), h.shape())?;
        check_shape("barrier objective", (nv, 1), (c.len(), 1))?;
        p += h;
        q += c;
    }
    for i in 0..nv {
        p[(i, i)] += config.damping;
    }

    // 2. Inequalities: barrier rows, then velocity-limit boxes.
    let mut rows: Vec<DMatrix<f64>> = Vec::with_capacity(barriers.len() + 1);
    let mut bounds: Vec<f64> = Vec::new();

    for barrier in barriers {
        let (g, b) = barrier.compute_qp_inequality(conf, dt)?;
        check_shape("barrier inequality", (barrier.dim(), nv), g.shape())?;
        check_shape("barrier inequality", (barrier.dim(), 1), (b.len(), 1))?;
        bounds.extend(b.iter());
        rows.push(g);
    }

    if config.velocity_limits {
        let limits = conf.tree().velocity_limits();
        if !limits.is_empty() {
            let mut g = DMatrix::zeros(2 * limits.len(), nv);
            for (row, &(idx_v, v_max)) in limits.iter().enumerate() {
                g[(row, idx_v)] = 1.0;
                g[(limits.len() + row, idx_v)] = -1.0;
                bounds.push(v_max);
            }
            for &(_, v_max) in &limits {
                bounds.push(v_max);
            }
            rows.push(g);
        }
    }

    let n_ineq = bounds.len();
    let mut g_all = DMatrix::zeros(n_ineq, nv);
    let mut row_offset = 0;
    for block in &rows {
        g_all.rows_mut(row_offset, block.nrows()).copy_from(block);
        row_offset += block.nrows();
    }
    debug_assert_eq!(row_offset, n_ineq, "inequality row count mismatch");

    // 3. Dispatch to the backend.
    match config.backend {
        Backend::Clarabel => solve_clarabel(&p, &q, &g_all, &bounds, config),
    }
}

// ---------------------------------------------------------------------------
// Clarabel backend
// ---------------------------------------------------------------------------

fn solve_clarabel(
    p: &DMatrix<f64>,
    q: &DVector<f64>,
    g: &DMatrix<f64>,
    bounds: &[f64],
    config: &SolverConfig,
) -> Result<DVector<f64>, SolveError> {
    let nv = q.len();

    let p_csc = dmatrix_to_csc_upper_tri(p);
    let g_csc = dmatrix_to_csc(g);
    let cones = if bounds.is_empty() {
        Vec::new()
    } else {
        vec![NonnegativeConeT(bounds.len())]
    };

    let settings = DefaultSettingsBuilder::default()
        .max_iter(config.max_iterations)
        .verbose(false)
        .build()
        .map_err(|e| SolveError::Backend(format!("{e:?}")))?;

    let q_slice: Vec<f64> = q.iter().copied().collect();

    let mut solver = DefaultSolver::new(&p_csc, &q_slice, &g_csc, bounds, &cones, settings);
    solver.solve();

    let solution = &solver.solution;
    match solution.status {
        SolverStatus::Solved | SolverStatus::AlmostSolved => {
            if matches!(solution.status, SolverStatus::AlmostSolved) {
                warn!("QP solved to reduced accuracy");
            }
            Ok(DVector::from_iterator(
                nv,
                solution.x.iter().take(nv).copied(),
            ))
        }
        status => Err(SolveError::Infeasible {
            status: format!("{status:?}"),
        }),
    }
}

fn check_shape(
    part: &'static str,
    expected: (usize, usize),
    got: (usize, usize),
) -> Result<(), SolveError> {
    if expected == got {
        Ok(())
    } else {
        Err(SolveError::ContributionShape {
            part,
            expected: format!("{}x{}", expected.0, expected.1),
            got: format!("{}x{}", got.0, got.1),
        })
    }
}

/// Convert a nalgebra `DMatrix<f64>` to a Clarabel `CscMatrix<f64>`.
fn dmatrix_to_csc(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for j in 0..ncols {
        for i in 0..nrows {
            let v = m[(i, j)];
            if v.abs() > 1e-15 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }

    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

/// Convert a symmetric `DMatrix<f64>` to upper-triangular `CscMatrix<f64>`.
fn dmatrix_to_csc_upper_tri(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for j in 0..ncols {
        for i in 0..=j.min(nrows.saturating_sub(1)) {
            let v = m[(i, j)];
            if v.abs() > 1e-15 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }

    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
