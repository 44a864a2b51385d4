#![allow(dead_code, non_snake_case, non_upper_case_globals)]
#![allow(unused_imports, unused_variables, unused_mut)]

use std::path::PathBuf;
use ndarray as nd;
use spin_gyro_sim::{
    mkdir,
    write_npz,
    observables,
    signal,
    species::Species,
};
use lib::open_loop::{ OpenLoop, B0_G };

const T1: f64 = 30.0; // s
const T2: f64 = 8.0; // s
const T_FINAL: f64 = 1000.0; // s
const DT: f64 = 1.0; // s
const SIGMOID_W: f64 = 1.0; // 1/s
const SIGMOID_TAU: f64 = 100.0; // s
const NAMP: usize = 25;

fn main() -> anyhow::Result<()> {
    let outdir = PathBuf::from("output");
    mkdir!(outdir);

    let species = Species::xe129(T1, T2);
    let op = OpenLoop::new(species, B0_G);
    let limit = observables::dynamic_range_limit(&species);
    let amps: nd::Array1<f64> = nd::Array1::logspace(
        10.0, limit.log10() - 3.0, limit.log10() + 1.0, NAMP);
    let n = (T_FINAL / DT) as usize;

    let mut measured: Vec<f64> = Vec::with_capacity(amps.len());
    eprint!("  {} / {} ", 0, amps.len());
    for (k, &amp) in amps.iter().enumerate() {
        let mut env = op.environment(n, DT)?;
        let ramp = signal::sigmoid(&env.time(), SIGMOID_W, SIGMOID_TAU);
        env.set_rotation(ramp * amp)?;
        let case = op.run(&env, true)?;
        measured.push(case.obs.omega_est[n - 1]);
        eprint!("\r  {} / {} ", k + 1, amps.len());
    }
    eprintln!();

    write_npz!(
        outdir.join("dynamic_range.npz"),
        arrays: {
            "amplitude" => &amps,
            "measured" => &nd::Array1::from_vec(measured),
            "limit" => &nd::array![limit],
        }
    );

    println!("done");
    Ok(())
}
