//! Open-loop operating point shared by the driver programs.
//!
//! The cell sits in a DC bias field with the `y` drive on resonance at the
//! optimal amplitude `2 / sqrt(T1 T2)`; world rotation and field noise are
//! injected on top of that baseline.

use ndarray as nd;
use spin_gyro_sim::{
    environment::{ EnvSample, Environment },
    error::Result,
    gyromag,
    observables::Observables,
    signal,
    solver::{ self, Trajectory },
    species::Species,
};

/// Reference initial polarization `(Kx, Ky, Kz)`.
pub const K0: [f64; 3] = [0.0259, 0.02, 0.3];

/// Equilibrium longitudinal polarization from spin-exchange pumping.
pub const PUMPING: f64 = 0.1;

/// Bias field used by the sweep programs [G].
pub const B0_G: f64 = 1e-6;

/// Open-loop operating point for one species.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OpenLoop {
    pub species: Species,
    /// Bias field [T].
    pub b0: f64,
}

impl OpenLoop {
    /// Operating point for a bias field given in Gauss.
    pub fn new(species: Species, b0_gauss: f64) -> Self {
        Self { species, b0: b0_gauss * gyromag::G2T }
    }

    /// Spin-exchange forcing vector.
    pub fn rse(&self) -> [f64; 3] {
        [0.0, 0.0, PUMPING / self.species.t1]
    }

    /// Baseline environment sample: bias field with the resonant `y` drive.
    pub fn drive(&self) -> EnvSample {
        EnvSample {
            b0: self.b0,
            ad_y: 2.0 / (self.species.t1 * self.species.t2).sqrt(),
            wd_y: self.species.gamma * self.b0,
            ..EnvSample::default()
        }
    }

    /// Constant baseline environment of `n` samples spaced `dt` apart.
    pub fn environment(&self, n: usize, dt: f64) -> Result<Environment> {
        Environment::constant(n, dt, self.drive())
    }

    /// Run the scenario over an environment and bundle the results with
    /// the injected ground truth.
    pub fn run(&self, env: &Environment, drive_enabled: bool) -> Result<Case> {
        let traj = solver::run(&self.species, env, K0, self.rse(), drive_enabled)?;
        let obs = traj.observables(&self.species, env)?;
        Ok(Case {
            time: env.time(),
            truth: env.w_r().to_owned(),
            traj,
            obs,
        })
    }

    /// Settling horizon after which startup transients are ignored [s].
    pub fn settle_time(&self) -> f64 { 8.0 * self.species.t2 }
}

/// One completed run next to the rotation profile that produced it.
#[derive(Clone, Debug)]
pub struct Case {
    pub time: nd::Array1<f64>,
    /// Injected world-rotation rate [rad s⁻¹].
    pub truth: nd::Array1<f64>,
    pub traj: Trajectory,
    pub obs: Observables,
}

impl Case {
    fn masked(&self, series: &nd::Array1<f64>, settle: f64) -> nd::Array1<f64> {
        series.iter().zip(self.time.iter())
            .filter_map(|(&x, &t)| (t > settle).then_some(x))
            .collect()
    }

    /// Peak estimated rotation over peak injected rotation, both taken
    /// past the settling horizon.
    pub fn amplitude_ratio(&self, settle: f64) -> f64 {
        let est = self.masked(&self.obs.omega_est, settle);
        let truth = self.masked(&self.truth, settle);
        let max = |s: &nd::Array1<f64>| {
            s.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x))
        };
        max(&est) / max(&truth)
    }

    /// Angle between the estimated and injected rotation series past the
    /// settling horizon [deg].
    pub fn phase_difference(&self, settle: f64) -> f64 {
        let est = self.masked(&self.obs.omega_est, settle);
        let truth = self.masked(&self.truth, settle);
        (est.dot(&truth) / signal::l2(&est) / signal::l2(&truth))
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees()
    }
}

#[cfg(test)]
mod test {
    use spin_gyro_sim::species::Species;
    use super::*;

    #[test]
    fn constant_rotation_metrics_are_flat() {
        let species = Species::xe129(30.0, 8.0);
        let op = OpenLoop::new(species, B0_G);
        let n = 500;
        let mut env = op.environment(n, 1.0).unwrap();
        env.set_rotation(nd::Array1::from_elem(n, 1e-3)).unwrap();
        let case = op.run(&env, true).unwrap();
        let settle = op.settle_time();
        let ratio = case.amplitude_ratio(settle);
        let phase = case.phase_difference(settle);
        assert!((ratio - 1.0).abs() < 0.05);
        assert!((0.0..2.0).contains(&phase));
    }
}
