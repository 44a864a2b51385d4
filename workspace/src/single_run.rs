#![allow(dead_code, non_snake_case, non_upper_case_globals)]
#![allow(unused_imports, unused_variables, unused_mut)]

use std::path::PathBuf;
use ndarray as nd;
use spin_gyro_sim::{
    mkdir,
    write_npz,
    config::RunConfig,
    filter,
    signal,
};
use lib::open_loop::OpenLoop;

const NOISE_ORDER: usize = 2;
const NOISE_CUTOFF: f64 = 0.1; // Hz

fn main() -> anyhow::Result<()> {
    let outdir = PathBuf::from("output");
    mkdir!(outdir);

    let config = match std::env::args().nth(1) {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let species = config.species_profile()?;
    let op = OpenLoop::new(species, config.b0);
    let n = config.steps();
    let fs = config.dt.recip();

    let mut env = op.environment(n, config.dt)?;
    env.set_rotation(nd::Array1::from_elem(n, config.rotation))?;
    if config.b_noise > 0.0 {
        let mut rng = rand::thread_rng();
        let noise =
            signal::white_noise(config.b_noise_tesla(), fs, n, &mut rng);
        env.set_field_noise(
            filter::low_pass(&noise, NOISE_ORDER, NOISE_CUTOFF, fs))?;
    }

    let case = op.run(&env, config.drive)?;
    println!(
        "estimate at t = {:.1}: {:.6e} rad/s",
        case.time[n - 1], case.obs.omega_est[n - 1],
    );

    write_npz!(
        outdir.join("single_run.npz"),
        arrays: {
            "time" => &case.time,
            "kt" => &case.traj.integrated(),
            "ks" => &case.traj.steady(),
            "kt_perp" => &case.obs.kt_perp,
            "ks_perp" => &case.obs.ks_perp,
            "phase" => &case.obs.phase,
            "omega_est" => &case.obs.omega_est,
            "omega_true" => &case.truth,
            "b_noise" => &env.b_noise(),
        }
    );

    println!("done");
    Ok(())
}
