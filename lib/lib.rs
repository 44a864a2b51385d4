#![allow(dead_code, non_snake_case, non_upper_case_globals)]

pub mod gyromag;
pub mod error;
pub mod species;
pub mod environment;
pub mod bloch;
pub mod solver;
pub mod observables;
pub mod signal;
pub mod filter;
pub mod lockin;
pub mod config;
pub mod utils;

#[doc(hidden)]
pub use ndarray_npy;
