//! Time series of the magnetic field, world rotation, and drive settings
//! seen by the spin ensemble over a run.

use ndarray as nd;
use crate::error::{ Error, Result };

/// Field and drive values at a single time index.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct EnvSample {
    /// DC bias field along z [T].
    pub b0: f64,
    /// Field noise along z [T].
    pub b_noise: f64,
    /// World rotation rate about z [rad s⁻¹].
    pub w_r: f64,
    /// x drive amplitude [s⁻¹].
    pub ad_x: f64,
    /// x drive frequency [rad s⁻¹].
    pub wd_x: f64,
    /// y drive amplitude [s⁻¹].
    pub ad_y: f64,
    /// y drive frequency [rad s⁻¹].
    pub wd_y: f64,
}

/// Uniformly sampled environment series.
///
/// All channels share one length and one step size `dt`; samples are read
/// back by index, so a single series can serve any number of concurrent
/// readers.
#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    dt: f64,
    b0: nd::Array1<f64>,
    b_noise: nd::Array1<f64>,
    w_r: nd::Array1<f64>,
    ad_x: nd::Array1<f64>,
    wd_x: nd::Array1<f64>,
    ad_y: nd::Array1<f64>,
    wd_y: nd::Array1<f64>,
}

impl Environment {
    /// Assemble a series from per-channel arrays.
    ///
    /// Fails if the arrays are empty or disagree in length, or if `dt` is
    /// not positive and finite.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dt: f64,
        b0: nd::Array1<f64>,
        b_noise: nd::Array1<f64>,
        w_r: nd::Array1<f64>,
        ad_x: nd::Array1<f64>,
        wd_x: nd::Array1<f64>,
        ad_y: nd::Array1<f64>,
        wd_y: nd::Array1<f64>,
    ) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(Error::ShapeMismatch(
                format!("time step must be positive and finite, got {}", dt)
            ));
        }
        let n = b0.len();
        if n == 0 {
            return Err(Error::ShapeMismatch("empty environment series".into()));
        }
        let lengths = [
            b_noise.len(), w_r.len(), ad_x.len(), wd_x.len(), ad_y.len(),
            wd_y.len(),
        ];
        if lengths.iter().any(|&l| l != n) {
            return Err(Error::ShapeMismatch(
                format!("environment channels disagree in length: \
                    {} vs {:?}", n, lengths)
            ));
        }
        Ok(Self { dt, b0, b_noise, w_r, ad_x, wd_x, ad_y, wd_y })
    }

    /// Series of `n` identical samples with step `dt`.
    pub fn constant(n: usize, dt: f64, sample: EnvSample) -> Result<Self> {
        let filled = |x: f64| nd::Array1::from_elem(n, x);
        Self::new(
            dt,
            filled(sample.b0),
            filled(sample.b_noise),
            filled(sample.w_r),
            filled(sample.ad_x),
            filled(sample.wd_x),
            filled(sample.ad_y),
            filled(sample.wd_y),
        )
    }

    /// Number of samples.
    pub fn len(&self) -> usize { self.b0.len() }

    pub fn is_empty(&self) -> bool { self.b0.is_empty() }

    /// Step size [s].
    pub fn dt(&self) -> f64 { self.dt }

    /// Time labels `t_i = i dt` for every sample.
    pub fn time(&self) -> nd::Array1<f64> {
        let n = self.len();
        nd::Array1::linspace(0.0, (n - 1) as f64 * self.dt, n)
    }

    /// Read back the sample at index `i`.
    ///
    /// *Panics* if `i` is out of bounds.
    pub fn sample(&self, i: usize) -> EnvSample {
        EnvSample {
            b0: self.b0[i],
            b_noise: self.b_noise[i],
            w_r: self.w_r[i],
            ad_x: self.ad_x[i],
            wd_x: self.wd_x[i],
            ad_y: self.ad_y[i],
            wd_y: self.wd_y[i],
        }
    }

    /// Replace the world-rotation channel.
    ///
    /// Fails if the new series has a different length.
    pub fn set_rotation(&mut self, w_r: nd::Array1<f64>) -> Result<()> {
        if w_r.len() != self.len() {
            return Err(Error::ShapeMismatch(
                format!("rotation series has length {}, expected {}",
                    w_r.len(), self.len())
            ));
        }
        self.w_r = w_r;
        Ok(())
    }

    /// Replace the field-noise channel.
    ///
    /// Fails if the new series has a different length.
    pub fn set_field_noise(&mut self, b_noise: nd::Array1<f64>) -> Result<()> {
        if b_noise.len() != self.len() {
            return Err(Error::ShapeMismatch(
                format!("field-noise series has length {}, expected {}",
                    b_noise.len(), self.len())
            ));
        }
        self.b_noise = b_noise;
        Ok(())
    }

    /// View of the bias-field channel.
    pub fn b0(&self) -> nd::ArrayView1<'_, f64> { self.b0.view() }

    /// View of the field-noise channel.
    pub fn b_noise(&self) -> nd::ArrayView1<'_, f64> { self.b_noise.view() }

    /// View of the world-rotation channel.
    pub fn w_r(&self) -> nd::ArrayView1<'_, f64> { self.w_r.view() }

    /// View of the x drive-amplitude channel.
    pub fn ad_x(&self) -> nd::ArrayView1<'_, f64> { self.ad_x.view() }

    /// View of the x drive-frequency channel.
    pub fn wd_x(&self) -> nd::ArrayView1<'_, f64> { self.wd_x.view() }

    /// View of the y drive-amplitude channel.
    pub fn ad_y(&self) -> nd::ArrayView1<'_, f64> { self.ad_y.view() }

    /// View of the y drive-frequency channel.
    pub fn wd_y(&self) -> nd::ArrayView1<'_, f64> { self.wd_y.view() }
}
