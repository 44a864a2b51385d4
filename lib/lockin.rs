//! Software dual-phase lock-in amplifier: reference mixing followed by a
//! zero-phase Butterworth output stage.

use std::f64::consts::{ FRAC_PI_2, TAU };
use ndarray as nd;
use crate::{ filter::Butterworth, signal };

/// Demodulated quadratures of one lock-in pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Demodulation {
    /// In-phase component, normalized to the input amplitude.
    pub x: nd::Array1<f64>,
    /// Quadrature component, normalized to the input amplitude.
    pub y: nd::Array1<f64>,
    /// Magnitude `sqrt(X² + Y²)`.
    pub r: nd::Array1<f64>,
    /// Phase `arctan(Y / X)` [rad].
    pub theta: nd::Array1<f64>,
}

/// Lock-in amplifier locked to an internally generated cosine reference.
#[derive(Clone, Debug)]
pub struct LockIn {
    filter: Butterworth,
    alpha: f64,
    amp: f64,
}

impl LockIn {
    /// Lock-in with the given output filter, reference phase `alpha`
    /// [rad], and output gain `amp`.
    pub fn new(filter: Butterworth, alpha: f64, amp: f64) -> Self {
        Self { filter, alpha, amp }
    }

    /// Demodulate a signal against the reference at `ref_freq` [Hz].
    ///
    /// The signal is mixed with both reference quadratures, scaled by twice
    /// the inverse of its centered peak amplitude, and low-pass filtered
    /// with zero phase lag. The phase is taken as the plain
    /// `arctan(Y / X)` against a sign-preserving denominator floor.
    ///
    /// *Panics* if the signal and time series differ in length.
    pub fn demodulate(
        &self,
        signal: &nd::Array1<f64>,
        time: &nd::Array1<f64>,
        ref_freq: f64,
    ) -> Demodulation
    {
        if signal.len() != time.len() {
            panic!("LockIn::demodulate: signal and time lengths differ");
        }
        let x_ref: nd::Array1<f64>
            = time.mapv(|t| (TAU * ref_freq * t + self.alpha).cos());
        let y_ref: nd::Array1<f64>
            = time.mapv(|t| (TAU * ref_freq * t + self.alpha + FRAC_PI_2).cos());
        let mean = signal.sum() / signal.len() as f64;
        let peak = signal.fold(f64::NEG_INFINITY, |acc, &s| acc.max(s - mean));
        let scale = 2.0 / peak;
        let x_mod = (signal * &x_ref) * scale;
        let y_mod = (signal * &y_ref) * scale;
        let x = self.filter.filtfilt(&x_mod) * self.amp;
        let y = self.filter.filtfilt(&y_mod) * self.amp;
        let r: nd::Array1<f64> = x.iter().zip(y.iter())
            .map(|(&xk, &yk)| xk.hypot(yk))
            .collect();
        let theta: nd::Array1<f64> = x.iter().zip(y.iter())
            .map(|(&xk, &yk)| (yk / signal::nonzero_denom(xk)).atan())
            .collect();
        Demodulation { x, y, r, theta }
    }
}
