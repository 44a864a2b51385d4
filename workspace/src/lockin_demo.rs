#![allow(dead_code, non_snake_case, non_upper_case_globals)]
#![allow(unused_imports, unused_variables, unused_mut)]

use std::{
    f64::consts::{ PI, TAU },
    path::PathBuf,
};
use ndarray as nd;
use spin_gyro_sim::{
    mkdir,
    write_npz,
    filter::Butterworth,
    lockin::LockIn,
};

const FREQ: f64 = 2.0; // Hz
const FS: f64 = 1000.0; // Hz
const TF: f64 = 5.0; // s
const AMP: f64 = 4.0;
const FILTER_ORDER: usize = 3;
const CUTOFF: f64 = 0.2; // Hz

fn main() {
    let outdir = PathBuf::from("output");
    mkdir!(outdir);

    let phi = PI / 5.0;
    let n = (TF * FS) as usize;
    let t: nd::Array1<f64> =
        nd::Array1::linspace(0.0, (n - 1) as f64 / FS, n);
    let x: nd::Array1<f64> =
        t.mapv(|tk| AMP * (TAU * FREQ * tk + phi).cos());

    let lia = LockIn::new(
        Butterworth::lowpass(FILTER_ORDER, CUTOFF, FS), 0.0, 1.0);
    let out = lia.demodulate(&x, &t, FREQ);
    println!("injected phase  = {:.6} rad", phi);
    println!("recovered phase = {:.6} rad", out.theta[n / 2]);

    write_npz!(
        outdir.join("lockin_demo.npz"),
        arrays: {
            "time" => &t,
            "signal" => &x,
            "x" => &out.x,
            "y" => &out.y,
            "r" => &out.r,
            "theta" => &out.theta,
        }
    );

    println!("done");
}
