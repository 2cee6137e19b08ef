//! Growth parameters.

use serde::{Deserialize, Serialize};

/// Controls branching, angles and shrinkage of each generation.
///
/// Every `*_var` field is a relative variation: a value `v` with variation
/// `r` is drawn uniformly from `[v(1-r), v(1+r)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    pub iterations: u32,
    pub child_number: u32,
    /// Blend of the child base normal away from the parent tip normal.
    pub n_angle: f32,
    /// Rotation of a child axis relative to its parent axis (radians).
    pub p_angle: f32,
    /// Length factor per generation.
    pub l_factor: f32,
    /// Radius factor per generation.
    pub r_factor: f32,
    pub n_angle_var: f32,
    pub p_angle_var: f32,
    pub l_factor_var: f32,
    pub r_factor_var: f32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            iterations: 5,
            child_number: 5,
            n_angle: 0.2,
            p_angle: 0.6,
            l_factor: 0.8,
            r_factor: 0.5,
            n_angle_var: 0.2,
            p_angle_var: 0.4,
            l_factor_var: 0.2,
            r_factor_var: 0.2,
        }
    }
}

impl TreeParams {
    pub fn with_branching(mut self, child_number: u32, iterations: u32) -> Self {
        self.child_number = child_number;
        self.iterations = iterations;
        self
    }

    pub fn with_angles(mut self, n_angle: f32, p_angle: f32) -> Self {
        self.n_angle = n_angle;
        self.p_angle = p_angle;
        self
    }

    pub fn with_factors(mut self, l_factor: f32, r_factor: f32) -> Self {
        self.l_factor = l_factor;
        self.r_factor = r_factor;
        self
    }

    pub fn with_variations(mut self, n_angle: f32, p_angle: f32, l_factor: f32, r_factor: f32) -> Self {
        self.n_angle_var = n_angle;
        self.p_angle_var = p_angle;
        self.l_factor_var = l_factor;
        self.r_factor_var = r_factor;
        self
    }

    /// Segments grown below the trunk: `sum_{i=1..iterations} child_number^i`.
    pub fn branch_count(&self) -> usize {
        let c = self.child_number as usize;
        (1..=self.iterations).map(|i| c.pow(i)).sum()
    }
}
