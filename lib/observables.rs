//! Observables derived from a completed trajectory: transverse magnitude,
//! precession phase, and the world-rotation estimate.

use std::f64::consts::PI;
use itertools::izip;
use ndarray as nd;
use crate::{
    environment::Environment,
    error::{ Error, Result },
    signal,
    solver::Trajectory,
    species::Species,
};

/// Transverse magnitude and phase series of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct Perpendicular {
    /// `|K⊥|` of the integrated trajectory.
    pub kt_perp: nd::Array1<f64>,
    /// `|K⊥|` of the steady-state series.
    pub ks_perp: nd::Array1<f64>,
    /// `arctan(K_y / K_x)` of the integrated trajectory [rad].
    pub phase: nd::Array1<f64>,
}

/// Full observable bundle for a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct Observables {
    /// `|K⊥|` of the integrated trajectory.
    pub kt_perp: nd::Array1<f64>,
    /// `|K⊥|` of the steady-state series.
    pub ks_perp: nd::Array1<f64>,
    /// Precession phase [rad].
    pub phase: nd::Array1<f64>,
    /// Estimated world-rotation rate [rad s⁻¹].
    pub omega_est: nd::Array1<f64>,
}

impl Trajectory {
    /// Transverse magnitude and phase of a completed run.
    ///
    /// The phase is the plain `arctan(K_y / K_x)`, taken against a
    /// sign-preserving floor on `K_x` so that a vanishing transverse
    /// component saturates the phase instead of poisoning it with NaN.
    ///
    /// Fails with [`Error::NotReady`] if the run is incomplete.
    pub fn perpendicular(&self) -> Result<Perpendicular> {
        if !self.is_done() { return Err(Error::NotReady); }
        let perp = |k: &nd::Array2<f64>| -> nd::Array1<f64> {
            k.rows().into_iter()
                .map(|row| row[0].hypot(row[1]))
                .collect()
        };
        let phase: nd::Array1<f64>
            = self.kt.rows().into_iter()
            .map(|row| (row[1] / signal::nonzero_denom(row[0])).atan())
            .collect();
        Ok(Perpendicular {
            kt_perp: perp(&self.kt),
            ks_perp: perp(&self.ks),
            phase,
        })
    }

    /// All derived observables of a completed run, including the
    /// world-rotation estimate for the environment it was run against.
    ///
    /// Fails with [`Error::NotReady`] if the run is incomplete.
    pub fn observables(&self, species: &Species, env: &Environment)
        -> Result<Observables>
    {
        let Perpendicular { kt_perp, ks_perp, phase }
            = self.perpendicular()?;
        let omega_est = world_rotation(&phase, species, env);
        Ok(Observables { kt_perp, ks_perp, phase, omega_est })
    }
}

/// Invert the phase model for the world-rotation rate:
/// `Ω_r = -φ γ₂ + γ B₀ - ω_dy`, elementwise over the run.
///
/// *Panics* if the phase series and the environment disagree in length.
pub fn world_rotation(
    phase: &nd::Array1<f64>,
    species: &Species,
    env: &Environment,
) -> nd::Array1<f64>
{
    if phase.len() != env.len() {
        panic!("world_rotation: phase and environment lengths differ");
    }
    izip!(phase.iter(), env.b0().iter(), env.wd_y().iter())
        .map(|(&ph, &b, &wdy)| {
            -ph * species.gamma2 + species.gamma * b - wdy
        })
        .collect()
}

/// Upper usable rotation frequency of the estimator, `1/(π T₂)` [Hz].
pub fn bandwidth_cutoff(species: &Species) -> f64 {
    (PI * species.t2).recip()
}

/// Rotation-rate scale at which the estimator saturates,
/// `1/sqrt(T₁ T₂)` [rad s⁻¹].
pub fn dynamic_range_limit(species: &Species) -> f64 {
    (species.t1 * species.t2).sqrt().recip()
}
