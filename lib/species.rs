//! Physical profile of a single nuclear-spin species.

use crate::gyromag;

/// Immutable physical parameters of one spin species in a given cell.
///
/// Relaxation rates are derived once at construction and used directly by
/// the generator matrix.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Species {
    /// Gyromagnetic ratio γ [rad s⁻¹ T⁻¹].
    pub gamma: f64,
    /// Longitudinal relaxation time T₁ [s].
    pub t1: f64,
    /// Transverse relaxation time T₂ [s].
    pub t2: f64,
    /// Longitudinal relaxation rate 1/T₁ [s⁻¹].
    pub gamma1: f64,
    /// Transverse relaxation rate 1/T₂ [s⁻¹].
    pub gamma2: f64,
}

impl Species {
    /// Create a new species profile.
    ///
    /// *Panics* if either relaxation time is non-positive. Infinite
    /// relaxation times are allowed and give zero decay rates.
    pub fn new(gamma: f64, t1: f64, t2: f64) -> Self {
        if t1 <= 0.0 || t2 <= 0.0 || t1.is_nan() || t2.is_nan() {
            panic!("Species::new: relaxation times must be positive");
        }
        Self { gamma, t1, t2, gamma1: t1.recip(), gamma2: t2.recip() }
    }

    /// ¹²⁹Xe with the given relaxation times.
    pub fn xe129(t1: f64, t2: f64) -> Self {
        Self::new(gyromag::GAMMA_XE129, t1, t2)
    }

    /// ¹³¹Xe with the given relaxation times.
    pub fn xe131(t1: f64, t2: f64) -> Self {
        Self::new(gyromag::GAMMA_XE131, t1, t2)
    }
}
