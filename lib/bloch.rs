//! Construction of the instantaneous Bloch generator matrix and its
//! steady-state solution.
//!
//! The polarization `K` of a driven, relaxing species obeys
//! `dK/dt = M K + R_se`, with `M` set by the fields, rotation, and drive in
//! effect at that instant. `M` is rebuilt from scratch for every
//! environment sample; nothing about it is cached between steps.

use ndarray as nd;
use ndarray_linalg::Solve;
use crate::{
    environment::EnvSample,
    error::{ Error, Result },
    species::Species,
};

/// Generator builder for one species.
///
/// Holds the per-run constants and produces the 3×3 generator fresh from a
/// single environment sample.
#[derive(Clone, Debug)]
pub struct BlochBuilder<'a> {
    species: &'a Species,
    rse: nd::Array1<f64>,
    drive_enabled: bool,
}

impl<'a> BlochBuilder<'a> {
    /// Create a new builder.
    ///
    /// *Panics* if the spin-exchange forcing vector is not of length 3.
    pub fn new(species: &'a Species, rse: nd::Array1<f64>, drive_enabled: bool)
        -> Self
    {
        if rse.len() != 3 {
            panic!("BlochBuilder::new: forcing vector must have length 3");
        }
        Self { species, rse, drive_enabled }
    }

    /// Spin-exchange forcing term, constant over a run.
    pub fn forcing(&self) -> nd::ArrayView1<'_, f64> { self.rse.view() }

    /// Whether the transverse drive enters the generator.
    pub fn drive_enabled(&self) -> bool { self.drive_enabled }

    /// Compute the generator matrix for one environment sample.
    ///
    /// The diagonal is `[-γ₂, -γ₂, -γ₁]`. The (x, y) block carries the
    /// Larmor and rotation frequencies; with the drive enabled, both drive
    /// frequencies are subtracted there (rotating-frame shift) and the
    /// antisymmetric drive couplings to z are filled in.
    pub fn gen_at(&self, sample: &EnvSample) -> nd::Array2<f64> {
        let Species { gamma, gamma1, gamma2, .. } = *self.species;
        let mut m: nd::Array2<f64> = nd::Array2::zeros((3, 3));
        m[[0, 0]] = -gamma2;
        m[[1, 1]] = -gamma2;
        m[[2, 2]] = -gamma1;
        let mut larmor
            = gamma * (sample.b0 + sample.b_noise) + sample.w_r;
        if self.drive_enabled {
            larmor -= sample.wd_x + sample.wd_y;
            m[[0, 2]] = -sample.ad_y / 2.0;
            m[[2, 0]] = sample.ad_y / 2.0;
            m[[1, 2]] = sample.ad_x / 2.0;
            m[[2, 1]] = -sample.ad_x / 2.0;
        }
        m[[0, 1]] = larmor;
        m[[1, 0]] = -larmor;
        m
    }

    /// Equilibrium polarization for the generator at one environment
    /// sample.
    pub fn steady_state_at(&self, sample: &EnvSample)
        -> Result<nd::Array1<f64>>
    {
        steady_state(&self.gen_at(sample), &self.rse)
    }
}

/// Solve `M K = -R_se` for the equilibrium polarization.
///
/// Fails with [`Error::SingularSystem`] if the factorization reports a
/// singular matrix or the solution is not finite; a near-singular system
/// must surface as an error here rather than as silent garbage downstream.
pub fn steady_state(m: &nd::Array2<f64>, rse: &nd::Array1<f64>)
    -> Result<nd::Array1<f64>>
{
    let rhs = rse.mapv(|r| -r);
    let ks = m.solve(&rhs)
        .map_err(|_| Error::SingularSystem { matrix: m.clone() })?;
    if ks.iter().any(|k| !k.is_finite()) {
        return Err(Error::SingularSystem { matrix: m.clone() });
    }
    Ok(ks)
}

#[cfg(test)]
mod test {
    use ndarray as nd;
    use crate::environment::EnvSample;
    use crate::species::Species;
    use super::*;

    fn sample() -> EnvSample {
        EnvSample {
            b0: 1e-4,
            b_noise: 2e-7,
            w_r: 0.3,
            ad_x: 0.02,
            wd_x: -5.0,
            ad_y: 0.13,
            wd_y: -7440.69,
        }
    }

    #[test]
    fn generator_structure() {
        let sp = Species::xe129(30.0, 8.0);
        let rse = nd::array![0.0, 0.0, 0.1 / 30.0];
        let builder = BlochBuilder::new(&sp, rse, true);
        let s = sample();
        let m = builder.gen_at(&s);
        let larmor = sp.gamma * (s.b0 + s.b_noise) + s.w_r - s.wd_x - s.wd_y;
        assert_eq!(m[[0, 0]], -sp.gamma2);
        assert_eq!(m[[1, 1]], -sp.gamma2);
        assert_eq!(m[[2, 2]], -sp.gamma1);
        assert_eq!(m[[0, 1]], larmor);
        assert_eq!(m[[1, 0]], -larmor);
        assert_eq!(m[[0, 2]], -s.ad_y / 2.0);
        assert_eq!(m[[2, 0]], s.ad_y / 2.0);
        assert_eq!(m[[1, 2]], s.ad_x / 2.0);
        assert_eq!(m[[2, 1]], -s.ad_x / 2.0);
    }

    #[test]
    fn drive_disabled_drops_couplings() {
        let sp = Species::xe129(30.0, 8.0);
        let rse = nd::array![0.0, 0.0, 0.1 / 30.0];
        let builder = BlochBuilder::new(&sp, rse, false);
        let s = sample();
        let m = builder.gen_at(&s);
        let larmor = sp.gamma * (s.b0 + s.b_noise) + s.w_r;
        assert_eq!(m[[0, 1]], larmor);
        assert_eq!(m[[0, 2]], 0.0);
        assert_eq!(m[[2, 0]], 0.0);
        assert_eq!(m[[1, 2]], 0.0);
        assert_eq!(m[[2, 1]], 0.0);
    }

    #[test]
    fn steady_state_solves_the_system() {
        let sp = Species::xe129(30.0, 8.0);
        let rse = nd::array![0.0, 0.0, 0.1 / 30.0];
        let builder = BlochBuilder::new(&sp, rse.clone(), true);
        let ks = builder.steady_state_at(&sample()).unwrap();
        let resid = builder.gen_at(&sample()).dot(&ks) + &rse;
        assert!(resid.iter().all(|r| r.abs() < 1e-12));
    }

    #[test]
    fn steady_state_resonant_drive() {
        // on-resonance y drive at amplitude 2/sqrt(T1 T2) gives
        // Kz = R_se,z T1 / 2
        let sp = Species::xe129(30.0, 8.0);
        let rse = nd::array![0.0, 0.0, 0.1 / 30.0];
        let builder = BlochBuilder::new(&sp, rse, true);
        let b0 = 1e-4;
        let s = EnvSample {
            b0,
            ad_y: 2.0 / (sp.t1 * sp.t2).sqrt(),
            wd_y: sp.gamma * b0,
            ..EnvSample::default()
        };
        let ks = builder.steady_state_at(&s).unwrap();
        assert!((ks[2] - 0.05).abs() < 1e-12);
        assert!((ks[0] + 0.05 * s.ad_y / 2.0 / sp.gamma2).abs() < 1e-12);
        assert!(ks[1].abs() < 1e-15);
    }

    #[test]
    fn singular_system_is_an_error() {
        let m: nd::Array2<f64> = nd::Array2::zeros((3, 3));
        let rse = nd::array![0.0, 0.0, 1.0];
        let res = steady_state(&m, &rse);
        assert!(matches!(res, Err(Error::SingularSystem { .. })));
    }
}
