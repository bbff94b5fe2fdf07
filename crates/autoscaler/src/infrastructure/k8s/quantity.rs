//! Kubernetes resource quantity parsing.
//!
//! The API serializes quantities as strings with SI or binary suffixes
//! (`250m`, `129Mi`, `1Gi`, `123456789n`). Only the subset metrics-server
//! actually emits is handled here; anything else is a parse failure the
//! caller turns into a transient error.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

/// Suffix table, two-character binary suffixes first so `Mi` is not read
/// as milli.
const SUFFIXES: &[(&str, f64)] = &[
    ("Ki", 1024.0),
    ("Mi", 1024.0 * 1024.0),
    ("Gi", 1024.0 * 1024.0 * 1024.0),
    ("Ti", 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("Pi", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("Ei", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("n", 1e-9),
    ("u", 1e-6),
    ("m", 1e-3),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

/// Parse a quantity string into its canonical numeric value
/// (cores for CPU, bytes for memory).
pub fn parse_quantity(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    // Plain and exponent forms ("2", "1.5", "123e3") parse directly.
    if let Ok(number) = value.parse::<f64>() {
        return Some(number);
    }
    for (suffix, factor) in SUFFIXES {
        if let Some(number) = value.strip_suffix(suffix) {
            return number.parse::<f64>().ok().map(|n| n * factor);
        }
    }
    None
}

/// CPU usage in millicores.
pub fn cpu_millicores(quantity: &Quantity) -> Option<f64> {
    parse_quantity(&quantity.0).map(|cores| cores * 1000.0)
}

/// Memory usage in bytes.
pub fn memory_bytes(quantity: &Quantity) -> Option<f64> {
    parse_quantity(&quantity.0)
}
