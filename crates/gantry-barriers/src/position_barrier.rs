//! Cartesian position barrier on a named frame.

use std::fmt;

use nalgebra::{DMatrix, DVector};

use gantry_kinematics::Configuration;

use crate::error::BarrierError;
use crate::Barrier;

/// Keeps selected world coordinates of a frame inside a box.
///
/// `indices` picks the world axes under constraint (default: all three);
/// each of `p_min` / `p_max` contributes one barrier row per index, so the
/// output dimension is `indices.len()` times the number of bound sides.
/// Rows are ordered min-side first, then max-side.
#[derive(Debug, Clone)]
pub struct PositionBarrier {
    frame: String,
    indices: Vec<usize>,
    p_min: Option<DVector<f64>>,
    p_max: Option<DVector<f64>>,
    gain: f64,
    safety_policy: f64,
    r: f64,
}

impl PositionBarrier {
    /// Create a barrier on `frame` with no bounds and default gains.
    pub fn new(frame: impl Into<String>) -> Self {
        Self {
            frame: frame.into(),
            indices: vec![0, 1, 2],
            p_min: None,
            p_max: None,
            gain: 1.0,
            safety_policy: 1.0,
            r: 0.0,
        }
    }

    /// Constrain only the given world axes (0 = x, 1 = y, 2 = z).
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range or bounds were already set
    /// (bounds are sized against the index set).
    #[must_use]
    pub fn with_indices(mut self, indices: &[usize]) -> Self {
        assert!(indices.iter().all(|&i| i < 3), "axis index out of range");
        assert!(
            self.p_min.is_none() && self.p_max.is_none(),
            "set indices before bounds"
        );
        self.indices = indices.to_vec();
        self
    }

    /// Lower position bound, one entry per constrained index.
    ///
    /// # Panics
    ///
    /// Panics if the bound length does not match the index set.
    #[must_use]
    pub fn with_min(mut self, p_min: &[f64]) -> Self {
        assert_eq!(p_min.len(), self.indices.len(), "bound/index length mismatch");
        self.p_min = Some(DVector::from_column_slice(p_min));
        self
    }

    /// Upper position bound, one entry per constrained index.
    ///
    /// # Panics
    ///
    /// Panics if the bound length does not match the index set.
    #[must_use]
    pub fn with_max(mut self, p_max: &[f64]) -> Self {
        assert_eq!(p_max.len(), self.indices.len(), "bound/index length mismatch");
        self.p_max = Some(DVector::from_column_slice(p_max));
        self
    }

    /// Set the exponential CBF gain.
    #[must_use]
    pub const fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    /// Set the backup safety-policy gain.
    #[must_use]
    pub const fn with_safety_policy(mut self, safety_policy: f64) -> Self {
        self.safety_policy = safety_policy;
        self
    }

    /// Set the safe radius `r` weighting the backup-policy objective.
    #[must_use]
    pub const fn with_safe_radius(mut self, r: f64) -> Self {
        self.r = r;
        self
    }

    /// The constrained frame.
    #[must_use]
    pub fn frame(&self) -> &str {
        &self.frame
    }
}

impl Barrier for PositionBarrier {
    fn dim(&self) -> usize {
        let sides = usize::from(self.p_min.is_some()) + usize::from(self.p_max.is_some());
        self.indices.len() * sides
    }

    fn gain(&self) -> f64 {
        self.gain
    }

    fn safe_radius(&self) -> f64 {
        self.r
    }

    fn safety_policy(&self) -> f64 {
        self.safety_policy
    }

    fn compute_barrier(&self, conf: &Configuration) -> Result<DVector<f64>, BarrierError> {
        let p = conf
            .transform_frame_to_world(&self.frame)?
            .translation
            .vector;

        let mut h = DVector::zeros(self.dim());
        let mut row = 0;
        if let Some(p_min) = &self.p_min {
            for (k, &axis) in self.indices.iter().enumerate() {
                h[row] = p[axis] - p_min[k];
                row += 1;
            }
        }
        if let Some(p_max) = &self.p_max {
            for (k, &axis) in self.indices.iter().enumerate() {
                h[row] = p_max[k] - p[axis];
                row += 1;
            }
        }
        Ok(h)
    }

    fn compute_jacobian(&self, conf: &Configuration) -> Result<DMatrix<f64>, BarrierError> {
        let position_jac = conf.frame_position_jacobian(&self.frame)?;

        let mut jacobian = DMatrix::zeros(self.dim(), conf.nv());
        let mut row = 0;
        if self.p_min.is_some() {
            for &axis in &self.indices {
                jacobian.row_mut(row).copy_from(&position_jac.row(axis));
                row += 1;
            }
        }
        if self.p_max.is_some() {
            for &axis in &self.indices {
                jacobian
                    .row_mut(row)
                    .copy_from(&(-position_jac.row(axis)));
                row += 1;
            }
        }
        Ok(jacobian)
    }
}

impl fmt::Display for PositionBarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PositionBarrier(frame={}, indices={:?}, gain={}, safety_policy={}, r={})",
            self.frame, self.indices, self.gain, self.safety_policy, self.r
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
