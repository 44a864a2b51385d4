//! Time-stepped integration of the driven Bloch equations over an
//! environment series.
//!
//! Each micro-interval freezes the generator at the sample opening the
//! interval and advances the polarization with classical RK4, subdividing
//! the interval as needed to stay well inside the stability region of the
//! stiffest generator entry. The per-sample equilibrium is solved alongside
//! so that a finished run carries both the integrated and steady-state
//! trajectories.

use ndarray as nd;
use crate::{
    bloch::{ BlochBuilder, steady_state },
    environment::Environment,
    error::{ Error, Result },
    species::Species,
};

/// Target upper bound on (substep size) × (largest generator entry).
const STEP_SCALE: f64 = 0.1;

/// Hard cap on RK4 substeps per micro-interval.
const MAX_SUBSTEPS: usize = 1 << 20;

/// Record of one solver run: time labels plus the integrated and
/// steady-state polarization series, one row per environment sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub(crate) time: nd::Array1<f64>,
    pub(crate) kt: nd::Array2<f64>,
    pub(crate) ks: nd::Array2<f64>,
    pub(crate) done: bool,
}

impl Trajectory {
    /// Number of samples.
    pub fn len(&self) -> usize { self.time.len() }

    pub fn is_empty(&self) -> bool { self.time.is_empty() }

    /// Whether the run that produced this record ran to completion.
    pub fn is_done(&self) -> bool { self.done }

    /// Time labels [s].
    pub fn time(&self) -> nd::ArrayView1<'_, f64> { self.time.view() }

    /// Integrated polarization, rows `(Kx, Ky, Kz)`.
    pub fn integrated(&self) -> nd::ArrayView2<'_, f64> { self.kt.view() }

    /// Per-sample equilibrium polarization, rows `(Kx, Ky, Kz)`.
    pub fn steady(&self) -> nd::ArrayView2<'_, f64> { self.ks.view() }
}

/// Lifecycle of a [`BlochSolver`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolverState {
    /// Constructed; only the initial condition is populated.
    Uninitialized,
    /// A run has started but not finished.
    Running,
    /// The run finished and the trajectory is complete.
    Done,
}

/// Single-run integrator for one species over one environment series.
///
/// A solver is built, optionally re-seeded with the equilibrium initial
/// condition, run exactly once, and then read out; a failed run leaves the
/// partial trajectory inaccessible.
#[derive(Clone, Debug)]
pub struct BlochSolver<'a> {
    species: &'a Species,
    env: &'a Environment,
    rse: nd::Array1<f64>,
    traj: Trajectory,
    state: SolverState,
}

impl<'a> BlochSolver<'a> {
    /// Create a solver with trajectory storage sized to the environment.
    ///
    /// The first integrated row is set to `k0`; everything else is filled
    /// in by [`run`][Self::run].
    pub fn new(
        species: &'a Species,
        env: &'a Environment,
        k0: [f64; 3],
        rse: [f64; 3],
    ) -> Self
    {
        let n = env.len();
        let mut kt: nd::Array2<f64> = nd::Array2::zeros((n, 3));
        kt.row_mut(0).assign(&nd::arr1(&k0));
        let traj = Trajectory {
            time: env.time(),
            kt,
            ks: nd::Array2::zeros((n, 3)),
            done: false,
        };
        Self { species, env, rse: nd::arr1(&rse), traj, state: SolverState::Uninitialized }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SolverState { self.state }

    /// Replace the initial condition with the equilibrium polarization of
    /// the first environment sample.
    ///
    /// *Panics* if the solver has already started.
    pub fn seed_steady_state(&mut self, drive_enabled: bool) -> Result<()> {
        if self.state != SolverState::Uninitialized {
            panic!("BlochSolver::seed_steady_state: solver has already started");
        }
        let builder
            = BlochBuilder::new(self.species, self.rse.clone(), drive_enabled);
        let ks = builder.steady_state_at(&self.env.sample(0))?;
        self.traj.kt.row_mut(0).assign(&ks);
        Ok(())
    }

    /// Integrate over the whole environment series.
    ///
    /// For each step `i ≥ 1` the generator is rebuilt from sample `i - 1`,
    /// its equilibrium is solved into the steady-state row `i - 1`, and the
    /// polarization is advanced over one `dt`; the last steady-state row
    /// comes from the final sample. Any singular equilibrium system or
    /// integration breakdown aborts the run with the offending step.
    ///
    /// *Panics* if called more than once.
    pub fn run(&mut self, drive_enabled: bool) -> Result<()> {
        if self.state != SolverState::Uninitialized {
            panic!("BlochSolver::run: solver can only run once");
        }
        self.state = SolverState::Running;
        let env = self.env;
        let n = env.len();
        let dt = env.dt();
        let builder
            = BlochBuilder::new(self.species, self.rse.clone(), drive_enabled);
        let mut k_prev: nd::Array1<f64> = self.traj.kt.row(0).to_owned();
        for i in 1..n {
            let m = builder.gen_at(&env.sample(i - 1));
            let ks = steady_state(&m, &self.rse)?;
            self.traj.ks.row_mut(i - 1).assign(&ks);
            let k_next = integrate_interval(&m, &self.rse, &k_prev, dt)
                .ok_or(Error::Integration { step: i })?;
            self.traj.kt.row_mut(i).assign(&k_next);
            k_prev = k_next;
        }
        let m = builder.gen_at(&env.sample(n - 1));
        let ks = steady_state(&m, &self.rse)?;
        self.traj.ks.row_mut(n - 1).assign(&ks);
        self.traj.done = true;
        self.state = SolverState::Done;
        Ok(())
    }

    /// Borrow the finished trajectory.
    ///
    /// Fails with [`Error::NotReady`] unless the run completed.
    pub fn trajectory(&self) -> Result<&Trajectory> {
        if self.state == SolverState::Done {
            Ok(&self.traj)
        } else {
            Err(Error::NotReady)
        }
    }

    /// Take ownership of the finished trajectory.
    ///
    /// Fails with [`Error::NotReady`] unless the run completed.
    pub fn into_trajectory(self) -> Result<Trajectory> {
        if self.state == SolverState::Done {
            Ok(self.traj)
        } else {
            Err(Error::NotReady)
        }
    }
}

/// Construct a solver, run it to completion, and return the finished
/// trajectory.
pub fn run(
    species: &Species,
    env: &Environment,
    k0: [f64; 3],
    rse: [f64; 3],
    drive_enabled: bool,
) -> Result<Trajectory>
{
    let mut solver = BlochSolver::new(species, env, k0, rse);
    solver.run(drive_enabled)?;
    solver.into_trajectory()
}

/// Number of RK4 substeps needed to keep the substep size well inside the
/// stability region of the frozen generator, or `None` if that would
/// exceed [`MAX_SUBSTEPS`].
fn substeps(m: &nd::Array2<f64>, dt: f64) -> Option<usize> {
    let scale: f64 = m.iter().fold(0.0, |acc, mk| acc.max(mk.abs()));
    let nsub = (dt * scale / STEP_SCALE).ceil().max(1.0);
    (nsub <= MAX_SUBSTEPS as f64).then_some(nsub as usize)
}

/// Advance `dK/dt = M K + R_se` over one micro-interval `[0, dt]` with `M`
/// frozen, using classical RK4 on a uniform subgrid.
///
/// Returns `None` if the substep count would exceed the cap or the result
/// is not finite.
fn integrate_interval(
    m: &nd::Array2<f64>,
    rse: &nd::Array1<f64>,
    k0: &nd::Array1<f64>,
    dt: f64,
) -> Option<nd::Array1<f64>>
{
    let rhs = |k: &nd::Array1<f64>| m.dot(k) + rse;
    let nsub = substeps(m, dt)?;
    let h = dt / nsub as f64;
    let mut k_old: nd::Array1<f64> = k0.clone();
    let mut k1: nd::Array1<f64>;
    let mut k2: nd::Array1<f64>;
    let mut k3: nd::Array1<f64>;
    let mut k4: nd::Array1<f64>;
    for _ in 0..nsub {
        k1 = rhs(&k_old);
        k2 = rhs(&(&k_old + &k1 * (h / 2.0)));
        k3 = rhs(&(&k_old + &k2 * (h / 2.0)));
        k4 = rhs(&(&k_old + &k3 * h));
        k_old = &k_old + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0);
    }
    k_old.iter().all(|k| k.is_finite()).then_some(k_old)
}
