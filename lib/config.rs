//! TOML-backed run parameters for the driver programs.
//!
//! Every key is optional; missing keys fall back to the reference open-loop
//! scenario. Integer values are accepted wherever a float is expected.

use std::{ fs, path::Path, str::FromStr };
use thiserror::Error;
use toml::{ Table, Value };
use crate::{ gyromag, species::Species };

/// Any error produced while reading a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown species {0:?}")]
    UnknownSpecies(String),
    #[error("invalid value for key {0:?}")]
    InvalidValue(&'static str),
}

/// Parameters of a single open-loop run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Species label in the isotope registry.
    pub species: String,
    /// Longitudinal relaxation time [s].
    pub t1: f64,
    /// Transverse relaxation time [s].
    pub t2: f64,
    /// Initial polarization `(Kx, Ky, Kz)`.
    pub k0: [f64; 3],
    /// Equilibrium longitudinal polarization from spin-exchange pumping;
    /// the forcing rate is `pumping / t1`.
    pub pumping: f64,
    /// DC bias field [G].
    pub b0: f64,
    /// Field-noise amplitude spectral density [G Hz^-1/2].
    pub b_noise: f64,
    /// Constant world-rotation rate [rad s⁻¹].
    pub rotation: f64,
    /// Whether the transverse drive is applied.
    pub drive: bool,
    /// Run duration [s].
    pub duration: f64,
    /// Micro-interval size [s].
    pub dt: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            species: "xe129".into(),
            t1: 30.0,
            t2: 8.0,
            k0: [0.0259, 0.02, 0.3],
            pumping: 0.1,
            b0: 1.0,
            b_noise: 0.0,
            rotation: 0.0,
            drive: true,
            duration: 500.0,
            dt: 1.0,
        }
    }
}

impl RunConfig {
    /// Read a configuration file, layering its keys over the defaults.
    pub fn load<P>(path: P) -> Result<Self, ConfigError>
    where P: AsRef<Path>
    {
        fs::read_to_string(path)?.parse()
    }

    /// Species profile for the configured isotope and relaxation times.
    pub fn species_profile(&self) -> Result<Species, ConfigError> {
        let gamma = gyromag::gamma(&self.species)
            .ok_or_else(|| ConfigError::UnknownSpecies(self.species.clone()))?;
        Ok(Species::new(gamma, self.t1, self.t2))
    }

    /// Number of solver steps, `floor(duration / dt)`.
    pub fn steps(&self) -> usize {
        (self.duration / self.dt).floor() as usize
    }

    /// Spin-exchange forcing vector.
    pub fn rse(&self) -> [f64; 3] {
        [0.0, 0.0, self.pumping / self.t1]
    }

    /// Bias field in Tesla.
    pub fn b0_tesla(&self) -> f64 { self.b0 * gyromag::G2T }

    /// Field-noise amplitude in Tesla.
    pub fn b_noise_tesla(&self) -> f64 { self.b_noise * gyromag::G2T }
}

impl FromStr for RunConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        let table: Table = s.parse()?;
        let mut cfg = Self::default();
        if let Some(v) = table.get("species") {
            cfg.species = v.as_str()
                .ok_or(ConfigError::InvalidValue("species"))?
                .to_string();
        }
        set_float(&table, "t1", &mut cfg.t1)?;
        set_float(&table, "t2", &mut cfg.t2)?;
        set_float(&table, "pumping", &mut cfg.pumping)?;
        set_float(&table, "b0", &mut cfg.b0)?;
        set_float(&table, "b_noise", &mut cfg.b_noise)?;
        set_float(&table, "rotation", &mut cfg.rotation)?;
        set_float(&table, "duration", &mut cfg.duration)?;
        set_float(&table, "dt", &mut cfg.dt)?;
        if let Some(v) = table.get("k0") {
            cfg.k0 = float_triple(v).ok_or(ConfigError::InvalidValue("k0"))?;
        }
        if let Some(v) = table.get("drive") {
            cfg.drive = v.as_bool()
                .ok_or(ConfigError::InvalidValue("drive"))?;
        }
        if gyromag::gamma(&cfg.species).is_none() {
            return Err(ConfigError::UnknownSpecies(cfg.species));
        }
        if !(cfg.t1 > 0.0) {
            return Err(ConfigError::InvalidValue("t1"));
        }
        if !(cfg.t2 > 0.0) {
            return Err(ConfigError::InvalidValue("t2"));
        }
        if !(cfg.dt > 0.0 && cfg.dt.is_finite()) {
            return Err(ConfigError::InvalidValue("dt"));
        }
        if !(cfg.duration >= cfg.dt) {
            return Err(ConfigError::InvalidValue("duration"));
        }
        Ok(cfg)
    }
}

fn float_value(v: &Value) -> Option<f64> {
    v.as_float().or_else(|| v.as_integer().map(|k| k as f64))
}

fn float_triple(v: &Value) -> Option<[f64; 3]> {
    let arr = v.as_array()?;
    if arr.len() != 3 { return None; }
    let mut out = [0.0; 3];
    for (slot, vk) in out.iter_mut().zip(arr.iter()) {
        *slot = float_value(vk)?;
    }
    Some(out)
}

fn set_float(table: &Table, key: &'static str, slot: &mut f64)
    -> Result<(), ConfigError>
{
    if let Some(v) = table.get(key) {
        *slot = float_value(v).ok_or(ConfigError::InvalidValue(key))?;
    }
    Ok(())
}
