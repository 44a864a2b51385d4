//! End-to-end open-loop gyroscope scenarios for the reference ¹²⁹Xe cell.

use std::f64::consts::TAU;
use ndarray as nd;
use spin_gyro_sim::{
    environment::{ EnvSample, Environment },
    observables,
    solver,
    species::Species,
};

const K0: [f64; 3] = [0.0259, 0.02, 0.3];

fn reference_cell() -> Species { Species::xe129(30.0, 8.0) }

fn rse(sp: &Species) -> [f64; 3] { [0.0, 0.0, 0.1 / sp.t1] }

fn open_loop_env(n: usize, dt: f64, sp: &Species, b0: f64) -> Environment {
    Environment::constant(
        n, dt,
        EnvSample {
            b0,
            ad_y: 2.0 / (sp.t1 * sp.t2).sqrt(),
            wd_y: sp.gamma * b0,
            ..EnvSample::default()
        },
    )
    .unwrap()
}

#[test]
fn static_cell_reads_zero_rotation() {
    let sp = reference_cell();
    let env = open_loop_env(500, 1.0, &sp, 1e-4);
    let traj = solver::run(&sp, &env, K0, rse(&sp), true).unwrap();
    assert!(traj.is_done());
    let obs = traj.observables(&sp, &env).unwrap();
    for (&t, &est) in traj.time().iter().zip(obs.omega_est.iter()) {
        if t >= 8.0 * sp.t2 {
            assert!(
                est.abs() < 1e-3,
                "rotation estimate {} at t = {}", est, t,
            );
        }
    }
}

#[test]
fn constant_rotation_is_recovered() {
    let sp = reference_cell();
    for (wr, tol) in [(1e-3, 1e-6), (1e-2, 1e-4)] {
        let mut env = open_loop_env(500, 1.0, &sp, 1e-4);
        env.set_rotation(nd::Array1::from_elem(500, wr)).unwrap();
        let traj = solver::run(&sp, &env, K0, rse(&sp), true).unwrap();
        let obs = traj.observables(&sp, &env).unwrap();
        // transients are long gone by half the run
        for i in 250..500 {
            assert!(
                (obs.omega_est[i] - wr).abs() < tol,
                "estimate {} at step {} for true rate {}",
                obs.omega_est[i], i, wr,
            );
        }
    }
}

#[test]
fn modulated_rotation_rolls_off_past_the_cutoff() {
    let sp = reference_cell();
    let cutoff = observables::bandwidth_cutoff(&sp);
    let slow = tracking_ratio(&sp, cutoff / 100.0);
    let fast = tracking_ratio(&sp, cutoff * 10.0);
    assert!(slow > 0.9, "in-band tracking ratio {}", slow);
    assert!(fast < 0.35, "out-of-band tracking ratio {}", fast);
}

/// Peak estimated rotation over peak true rotation for a sinusoidal
/// rotation profile, evaluated after the startup transient.
fn tracking_ratio(sp: &Species, freq: f64) -> f64 {
    let wr_amp = 0.01;
    let period = freq.recip();
    let dt = period / 1000.0;
    let t_final = (2.0 * period).max(10.0 * sp.t2);
    let n = (t_final / dt).floor() as usize;
    let mut env = open_loop_env(n, dt, sp, 1e-4);
    let time = env.time();
    let wr = time.mapv(|t| wr_amp * (TAU * freq * t).sin());
    env.set_rotation(wr.clone()).unwrap();
    let traj = solver::run(sp, &env, K0, rse(sp), true).unwrap();
    let obs = traj.observables(sp, &env).unwrap();
    let settled = |series: &nd::Array1<f64>| -> f64 {
        series.iter().zip(time.iter())
            .filter(|(_, &t)| t > 8.0 * sp.t2)
            .fold(f64::NEG_INFINITY, |acc, (&x, _)| acc.max(x))
    };
    settled(&obs.omega_est) / settled(&wr)
}
