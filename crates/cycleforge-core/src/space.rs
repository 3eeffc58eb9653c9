//! # Toroidal Space
//!
//! The fixed-dimension unit hypercube `[0,1)^d` with periodic boundaries.
//!
//! Distance is taken axis by axis: each coordinate difference is replaced by
//! the shorter of the direct and the wrap-around separation, and the
//! per-axis results are combined with the Euclidean norm.

use crate::{CycleforgeError, Position};
use rand::Rng;
use rand_distr::StandardNormal;

/// A periodic unit hypercube of fixed dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToroidalSpace {
    dimension: usize,
}

impl ToroidalSpace {
    /// Create a space of the given dimension.
    ///
    /// Returns `InvalidConfig` for a zero dimension.
    pub fn new(dimension: usize) -> Result<Self, CycleforgeError> {
        if dimension == 0 {
            return Err(CycleforgeError::invalid(
                "dimension",
                "must be at least 1",
            ));
        }
        Ok(Self { dimension })
    }

    /// Number of axes.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Map an arbitrary real vector into `[0,1)^d`, component-wise modulo 1.
    pub fn wrap(&self, coords: &[f64]) -> Result<Position, CycleforgeError> {
        self.check_dimension(coords.len())?;
        Ok(Position::from_coords(
            coords.iter().map(|&c| wrap_unit(c)).collect(),
        ))
    }

    /// Toroidal distance between two points of this space.
    pub fn distance(&self, p: &Position, q: &Position) -> Result<f64, CycleforgeError> {
        self.check_dimension(p.dimension())?;
        self.check_dimension(q.dimension())?;
        Ok(axis_wrapped_norm(p.coords(), q.coords()))
    }

    /// Draw a point uniformly from the hypercube.
    pub fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::from_coords((0..self.dimension).map(|_| rng.r#gen::<f64>()).collect())
    }

    /// Displace `origin` by an isotropic Gaussian step of standard deviation
    /// `sigma` and wrap the result back into the space.
    ///
    /// Returns `InvalidConfig` when the displaced coordinate is not finite.
    pub fn jitter<R: Rng + ?Sized>(
        &self,
        origin: &Position,
        sigma: f64,
        rng: &mut R,
    ) -> Result<Position, CycleforgeError> {
        self.check_dimension(origin.dimension())?;
        let coords = origin
            .coords()
            .iter()
            .map(|&c| {
                let z: f64 = rng.sample(StandardNormal);
                let moved = c + sigma * z;
                if !moved.is_finite() {
                    return Err(CycleforgeError::invalid(
                        "extend_sigma",
                        format!("{sigma} displaces a coordinate to {moved}"),
                    ));
                }
                Ok(wrap_unit(moved))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Position::from_coords(coords))
    }

    fn check_dimension(&self, found: usize) -> Result<(), CycleforgeError> {
        if found != self.dimension {
            return Err(CycleforgeError::DimensionMismatch {
                expected: self.dimension,
                found,
            });
        }
        Ok(())
    }
}

/// Reduce a coordinate into `[0,1)`.
///
/// `rem_euclid` rounds tiny negative inputs up to exactly `1.0`, which is
/// folded back onto `0.0`.
fn wrap_unit(c: f64) -> f64 {
    let w = c.rem_euclid(1.0);
    if w >= 1.0 { 0.0 } else { w }
}

/// Euclidean norm of the per-axis wrap-around separations.
///
/// Both slices must have the same length.
fn axis_wrapped_norm(p: &[f64], q: &[f64]) -> f64 {
    p.iter()
        .zip(q)
        .map(|(a, b)| {
            let d = (a - b).abs();
            let d = d.min(1.0 - d);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

// =============================================================================
// TESTS
// =============================================================================
