#![allow(dead_code, non_snake_case, non_upper_case_globals)]
#![allow(unused_imports, unused_variables, unused_mut)]

use std::{
    f64::consts::TAU,
    path::PathBuf,
};
use ndarray as nd;
use rayon::iter::{ IntoParallelIterator, ParallelIterator };
use spin_gyro_sim::{
    mkdir,
    write_npz,
    observables,
    species::Species,
};
use lib::open_loop::{ OpenLoop, B0_G };

const T1: f64 = 30.0; // s
const T2: f64 = 8.0; // s
const WR_AMP: f64 = 0.01; // rad/s
const POINTS_PER_PERIOD: usize = 1000;
const NUM_PERIODS: f64 = 2.0;
const DECADES: f64 = 2.0;
const NFREQ: usize = 30;

/// Amplitude ratio and phase difference of the estimate against a pure
/// sinusoidal rotation at `freq`.
fn sweep_point(op: &OpenLoop, freq: f64) -> anyhow::Result<(f64, f64)> {
    let period = freq.recip();
    let dt = period / POINTS_PER_PERIOD as f64;
    let t_final = (NUM_PERIODS * period).max(10.0 * op.species.t2);
    let n = (t_final / dt).floor() as usize;
    let mut env = op.environment(n, dt)?;
    let rotation = env.time().mapv(|t| WR_AMP * (TAU * freq * t).sin());
    env.set_rotation(rotation)?;
    let case = op.run(&env, true)?;
    let settle = op.settle_time();
    Ok((case.amplitude_ratio(settle), case.phase_difference(settle)))
}

fn main() -> anyhow::Result<()> {
    let outdir = PathBuf::from("output");
    mkdir!(outdir);

    let species = Species::xe129(T1, T2);
    let op = OpenLoop::new(species, B0_G);
    let cutoff = observables::bandwidth_cutoff(&species);
    let freqs: nd::Array1<f64> = nd::Array1::logspace(
        10.0, cutoff.log10() - DECADES, cutoff.log10() + DECADES, NFREQ);

    let len = freqs.len();
    let progress = std::sync::atomic::AtomicUsize::new(0);
    eprint!("  {} / {} ", 0, len);
    let results: anyhow::Result<Vec<(f64, f64)>> =
        freqs.to_vec()
        .into_par_iter()
        .map(|freq| {
            let point = sweep_point(&op, freq);
            let k = progress.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            eprint!("\r  {} / {} ", k + 1, len);
            point
        })
        .collect();
    eprintln!();
    let (ratio, phase): (Vec<f64>, Vec<f64>) = results?.into_iter().unzip();

    write_npz!(
        outdir.join("bandwidth.npz"),
        arrays: {
            "freq" => &freqs,
            "amplitude_ratio" => &nd::Array1::from_vec(ratio),
            "phase_diff" => &nd::Array1::from_vec(phase),
            "cutoff" => &nd::array![cutoff],
        }
    );

    println!("done");
    Ok(())
}
