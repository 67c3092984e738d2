//! Settings shared by the metric entry points.

use crate::community::Louvain;
use crate::dedup::EdgeDedup;
use crate::error::{Error, Result};
use rand::prelude::*;

/// Metric parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsConfig {
    /// Exponent of the loneliness score.
    pub loneliness_alpha: f64,
    /// Modularity resolution of the built-in community oracle.
    pub resolution: f64,
    /// Seed for node shuffling and outlier ordering; thread RNG when absent.
    pub seed: Option<u64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            loneliness_alpha: 1.0,
            resolution: 1.0,
            seed: None,
        }
    }
}

impl MetricsConfig {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the loneliness exponent.
    pub fn with_loneliness_alpha(mut self, alpha: f64) -> Self {
        self.loneliness_alpha = alpha;
        self
    }

    /// Set the modularity resolution.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Fix the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject non-finite or out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if !self.loneliness_alpha.is_finite() || self.loneliness_alpha < 0.0 {
            return Err(Error::InvalidParameter {
                name: "loneliness_alpha",
                message: "must be finite and >= 0",
            });
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "resolution",
                message: "must be finite and > 0",
            });
        }
        Ok(())
    }

    /// Louvain oracle at the configured resolution.
    pub fn louvain(&self) -> Louvain {
        Louvain::new().with_resolution(self.resolution)
    }

    /// Edge deduplicator that shuffles node ids with the configured seed.
    pub fn shuffling_dedup(&self) -> EdgeDedup {
        let dedup = EdgeDedup::new().with_shuffle(true);
        match self.seed {
            Some(seed) => dedup.with_seed(seed),
            None => dedup,
        }
    }

    /// Seeded RNG, or the thread RNG when no seed is set.
    pub fn rng(&self) -> Box<dyn RngCore> {
        match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        }
    }
}
