//! Gyromagnetic ratios and field-unit conversions for the noble-gas
//! isotopes of interest.

use indexmap::IndexMap;

/// Gyromagnetic ratio of ¹²⁹Xe [rad s⁻¹ T⁻¹].
pub const GAMMA_XE129: f64 = -74.4069e6;

/// Gyromagnetic ratio of ¹³¹Xe [rad s⁻¹ T⁻¹].
pub const GAMMA_XE131: f64 = 22.0564e6;

/// Gauss per Tesla.
pub const T2G: f64 = 1e4;

/// Tesla per Gauss.
pub const G2T: f64 = 1e-4;

/// All known isotopes, keyed by label.
pub fn isotopes() -> IndexMap<&'static str, f64> {
    [
        ("xe129", GAMMA_XE129),
        ("xe131", GAMMA_XE131),
    ]
    .into_iter()
    .collect()
}

/// Look up the gyromagnetic ratio of a single isotope by label.
pub fn gamma(label: &str) -> Option<f64> {
    isotopes().get(label).copied()
}
