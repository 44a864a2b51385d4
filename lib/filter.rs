//! Digital Butterworth low-pass filtering with zero-phase application.
//!
//! Coefficients come from the analog prototype (poles equally spaced on the
//! left unit semicircle) scaled to the pre-warped cutoff and mapped through
//! the bilinear transform. Filtering runs in direct form II transposed;
//! [`Butterworth::filtfilt`] applies the filter forward and backward over
//! an odd-symmetric edge extension so the result carries no phase lag.

use std::f64::consts::PI;
use ndarray::{ self as nd, s };
use ndarray_linalg::Solve;
use num_complex::Complex64 as C64;
use num_traits::{ One, Zero };

/// Digital low-pass filter in transfer-function form, `a[0] = 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Butterworth {
    b: nd::Array1<f64>,
    a: nd::Array1<f64>,
}

impl Butterworth {
    /// Design a low-pass filter of the given order.
    ///
    /// `cutoff` and `sample_rate` are in the same frequency units.
    ///
    /// *Panics* if the order is zero or the cutoff does not lie strictly
    /// inside the Nyquist band.
    pub fn lowpass(order: usize, cutoff: f64, sample_rate: f64) -> Self {
        if order == 0 {
            panic!("Butterworth::lowpass: order must be positive");
        }
        let wn = cutoff / (sample_rate / 2.0);
        if !(wn > 0.0 && wn < 1.0) {
            panic!("Butterworth::lowpass: cutoff must lie strictly inside \
                the Nyquist band");
        }
        let warped = 4.0 * (PI * wn / 2.0).tan();
        let fs2 = C64::from(4.0);
        let mut gain = warped.powi(order as i32);
        let mut poles: Vec<C64> = Vec::with_capacity(order);
        let mut denom = C64::one();
        for k in 0..order {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            let pa = warped * C64::from_polar(1.0, theta);
            poles.push((fs2 + pa) / (fs2 - pa));
            denom *= fs2 - pa;
        }
        gain *= denom.inv().re;
        let zeros = vec![-C64::one(); order];
        let b: nd::Array1<f64>
            = poly(&zeros).into_iter().map(|c| gain * c.re).collect();
        let a: nd::Array1<f64>
            = poly(&poles).into_iter().map(|c| c.re).collect();
        Self { b, a }
    }

    /// Numerator and denominator coefficients, descending powers of
    /// `z^-1`.
    pub fn coefficients(&self)
        -> (nd::ArrayView1<'_, f64>, nd::ArrayView1<'_, f64>)
    {
        (self.b.view(), self.a.view())
    }

    /// Causal single-pass filtering from rest.
    pub fn lfilter(&self, x: &nd::Array1<f64>) -> nd::Array1<f64> {
        self.lfilter_from(x, &nd::Array1::zeros(self.a.len() - 1))
    }

    /// Causal single-pass filtering from the delay state `z0`.
    fn lfilter_from(&self, x: &nd::Array1<f64>, z0: &nd::Array1<f64>)
        -> nd::Array1<f64>
    {
        let b = &self.b;
        let a = &self.a;
        let nf = a.len();
        let mut z = z0.to_vec();
        let mut y: nd::Array1<f64> = nd::Array1::zeros(x.len());
        for (yi, &xi) in y.iter_mut().zip(x.iter()) {
            let out = b[0] * xi + z[0];
            for j in 0..nf - 2 {
                z[j] = b[j + 1] * xi + z[j + 1] - a[j + 1] * out;
            }
            z[nf - 2] = b[nf - 1] * xi - a[nf - 1] * out;
            *yi = out;
        }
        y
    }

    /// Delay state that makes the step response settle immediately: feeding
    /// a constant `c` with initial state `zi * c` returns `c` from the
    /// first sample on.
    pub fn lfilter_zi(&self) -> nd::Array1<f64> {
        let b = &self.b;
        let a = &self.a;
        let nf = a.len();
        let m = nf - 1;
        let mut sys = nd::Array2::<f64>::eye(m);
        for i in 0..m {
            sys[[i, 0]] += a[i + 1];
            if i + 1 < m { sys[[i, i + 1]] -= 1.0; }
        }
        let rhs: nd::Array1<f64>
            = (1..nf).map(|i| b[i] - a[i] * b[0]).collect();
        sys.solve(&rhs).unwrap_or_else(|_| {
            panic!("Butterworth::lfilter_zi: filter has a pole at z = 1")
        })
    }

    /// Zero-phase filtering: forward pass, backward pass, with the signal
    /// extended at both edges by odd reflection to suppress transients.
    ///
    /// *Panics* if the input is not longer than the edge extension,
    /// 3 × (filter length).
    pub fn filtfilt(&self, x: &nd::Array1<f64>) -> nd::Array1<f64> {
        let pad = 3 * self.a.len().max(self.b.len());
        let n = x.len();
        if n <= pad {
            panic!("Butterworth::filtfilt: need more than {} samples, got {}",
                pad, n);
        }
        let mut ext: nd::Array1<f64> = nd::Array1::zeros(n + 2 * pad);
        for j in 0..pad {
            ext[j] = 2.0 * x[0] - x[pad - j];
            ext[pad + n + j] = 2.0 * x[n - 1] - x[n - 2 - j];
        }
        ext.slice_mut(s![pad..pad + n]).assign(x);
        let zi = self.lfilter_zi();
        let fwd = self.lfilter_from(&ext, &(&zi * ext[0]));
        let rev: nd::Array1<f64> = fwd.slice(s![..;-1]).to_owned();
        let back = self.lfilter_from(&rev, &(&zi * rev[0]));
        back.slice(s![..;-1]).slice(s![pad..pad + n]).to_owned()
    }
}

/// One-call low-pass: design a Butterworth filter and run it forward and
/// backward over `data`.
pub fn low_pass(
    data: &nd::Array1<f64>,
    order: usize,
    cutoff: f64,
    sample_rate: f64,
) -> nd::Array1<f64>
{
    Butterworth::lowpass(order, cutoff, sample_rate).filtfilt(data)
}

/// Monic polynomial coefficients, descending powers, from a root set.
fn poly(roots: &[C64]) -> Vec<C64> {
    let mut coeffs: Vec<C64> = vec![C64::one()];
    for r in roots {
        let mut next: Vec<C64> = vec![C64::zero(); coeffs.len() + 1];
        for (k, c) in coeffs.iter().enumerate() {
            next[k] += *c;
            next[k + 1] -= *c * *r;
        }
        coeffs = next;
    }
    coeffs
}
