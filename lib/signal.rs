//! Profile and noise helpers for building environment channels and
//! reference signals.

use std::f64::consts::{ PI, TAU };
use ndarray::{ self as nd, s };
use rand::Rng;
use rand_distr::{ Distribution, Normal };

/// Smallest denominator magnitude allowed in phase extraction.
pub const DENOM_EPSILON: f64 = 1e-15;

/// Clamp a denominator away from zero, preserving its sign.
pub fn nonzero_denom(x: f64) -> f64 {
    if x.abs() < DENOM_EPSILON { DENOM_EPSILON.copysign(x) } else { x }
}

/// Normalized Gaussian profile over `x`, centered at `mu` with width
/// `sigma`.
pub fn gaussian(x: &nd::Array1<f64>, mu: f64, sigma: f64) -> nd::Array1<f64> {
    let norm = (sigma * (2.0 * PI).sqrt()).recip();
    x.mapv(|xk| norm * (-(xk - mu).powi(2) / (2.0 * sigma * sigma)).exp())
}

/// Logistic step from 0 to 1 centered at `tau` with rate `w`.
pub fn sigmoid(x: &nd::Array1<f64>, w: f64, tau: f64) -> nd::Array1<f64> {
    x.mapv(|xk| ((-w * (xk - tau)).exp() + 1.0).recip())
}

/// Ramp of slope `m` switching on at `x0`.
pub fn relu(x: &nd::Array1<f64>, x0: f64, m: f64) -> nd::Array1<f64> {
    x.mapv(|xk| if xk > x0 { m * (xk - x0) } else { 0.0 })
}

/// Sine wave of frequency `f` [Hz], gated to zero before its first full
/// period.
pub fn flat_sine(x: &nd::Array1<f64>, f: f64) -> nd::Array1<f64> {
    x.mapv(|xk| {
        let ph = TAU * f * xk;
        if ph >= TAU { ph.sin() } else { 0.0 }
    })
}

/// Same-length moving-average smoothing with a box window of `box_pts`
/// samples.
///
/// *Panics* if the window is empty.
pub fn smooth(y: &nd::Array1<f64>, box_pts: usize) -> nd::Array1<f64> {
    if box_pts == 0 { panic!("smooth: window must be non-empty"); }
    let n = y.len();
    if n == 0 { return nd::Array1::zeros(0); }
    let off = (box_pts - 1) / 2;
    let inv = (box_pts as f64).recip();
    (0..n).map(|i| {
        let t = i + off;
        let lo = t.saturating_sub(box_pts - 1);
        let hi = t.min(n - 1);
        y.slice(s![lo..=hi]).sum() * inv
    }).collect()
}

/// Euclidean norm of `x`.
pub fn l2(x: &nd::Array1<f64>) -> f64 {
    x.iter().map(|xk| xk * xk).sum::<f64>().sqrt()
}

/// Gaussian white noise with amplitude spectral density `amplitude`
/// sampled at `sampling_freq`; the per-sample deviation is
/// `amplitude sqrt(f_s / 2)`.
pub fn white_noise<R>(
    amplitude: f64,
    sampling_freq: f64,
    n: usize,
    rng: &mut R,
) -> nd::Array1<f64>
where R: Rng + ?Sized
{
    let sigma = (amplitude * amplitude * sampling_freq / 2.0).sqrt();
    let gauss = Normal::new(0.0, sigma)
        .unwrap_or_else(|_| panic!("white_noise: invalid noise amplitude"));
    (0..n).map(|_| gauss.sample(rng)).collect()
}

#[cfg(test)]
mod test {
    use ndarray as nd;
    use rand::SeedableRng;
    use super::*;

    #[test]
    fn denominator_guard_preserves_sign() {
        assert_eq!(nonzero_denom(2.5), 2.5);
        assert_eq!(nonzero_denom(-2.5), -2.5);
        assert_eq!(nonzero_denom(0.0), DENOM_EPSILON);
        assert_eq!(nonzero_denom(-0.0), -DENOM_EPSILON);
        assert_eq!(nonzero_denom(1e-17), DENOM_EPSILON);
        assert_eq!(nonzero_denom(-1e-17), -DENOM_EPSILON);
    }

    #[test]
    fn gaussian_profile() {
        let x = nd::Array1::linspace(-5.0, 5.0, 11);
        let g = gaussian(&x, 0.0, 1.0);
        let peak = (2.0 * PI).sqrt().recip();
        assert!((g[5] - peak).abs() < 1e-15);
        assert!((g[4] - peak * (-0.5_f64).exp()).abs() < 1e-15);
        assert_eq!(g[4], g[6]);
    }

    #[test]
    fn sigmoid_step() {
        let x = nd::array![0.0, 100.0, 200.0];
        let s = sigmoid(&x, 1.0, 100.0);
        assert!(s[0] < 1e-15);
        assert!((s[1] - 0.5).abs() < 1e-15);
        assert!(s[2] > 1.0 - 1e-15);
    }

    #[test]
    fn relu_ramp() {
        let x = nd::array![0.0, 30.0, 50.0];
        let r = relu(&x, 30.0, 0.1);
        assert_eq!(r[0], 0.0);
        assert_eq!(r[1], 0.0);
        assert!((r[2] - 2.0).abs() < 1e-15);
    }

    #[test]
    fn flat_sine_gates_first_period() {
        let f = 0.5;
        let x = nd::array![0.0, 1.0, 1.9, 2.0, 2.5];
        let y = flat_sine(&x, f);
        assert_eq!(y[0], 0.0);
        assert_eq!(y[1], 0.0);
        assert_eq!(y[2], 0.0);
        // gate opens exactly at the period boundary
        assert!((y[3] - (TAU * f * 2.0).sin()).abs() < 1e-15);
        assert!((y[4] - (TAU * f * 2.5).sin()).abs() < 1e-15);
    }

    #[test]
    fn smooth_matches_same_mode_convolution() {
        let y = nd::array![1.0, 2.0, 3.0, 4.0, 5.0];
        let s = smooth(&y, 3);
        assert!((s[0] - 1.0).abs() < 1e-15);
        assert!((s[1] - 2.0).abs() < 1e-15);
        assert!((s[2] - 3.0).abs() < 1e-15);
        assert!((s[3] - 4.0).abs() < 1e-15);
        assert!((s[4] - 3.0).abs() < 1e-15);
    }

    #[test]
    fn smooth_even_window_offsets_left() {
        let y = nd::array![0.0, 0.0, 4.0, 0.0, 0.0];
        let s = smooth(&y, 2);
        assert_eq!(s[1], 0.0);
        assert_eq!(s[2], 2.0);
        assert_eq!(s[3], 2.0);
        assert_eq!(s[4], 0.0);
    }

    #[test]
    fn l2_norm() {
        let x = nd::array![3.0, 4.0];
        assert!((l2(&x) - 5.0).abs() < 1e-15);
        assert_eq!(l2(&nd::Array1::zeros(4)), 0.0);
    }

    #[test]
    fn white_noise_statistics() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(12);
        let amp = 0.067;
        let fs = 40.0;
        let n = 20_000;
        let noise = white_noise(amp, fs, n, &mut rng);
        let sigma = amp * (fs / 2.0).sqrt();
        let mean = noise.sum() / n as f64;
        let var = noise.mapv(|x| (x - mean) * (x - mean)).sum() / n as f64;
        assert!(mean.abs() < 5.0 * sigma / (n as f64).sqrt());
        assert!((var.sqrt() - sigma).abs() < 0.05 * sigma);
    }
}
