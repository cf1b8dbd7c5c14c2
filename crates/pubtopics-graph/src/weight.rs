//! Edge weight coercion.

use serde_json::Value;
use tracing::debug;

/// Weight used when an edge carries no usable weight.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Coerce a raw edge weight to a number.
///
/// Numbers and numeric strings are used as-is. Missing, non-numeric and
/// non-finite weights fall back to [`DEFAULT_WEIGHT`].
pub fn coerce_weight(raw: Option<&Value>) -> f64 {
    let parsed = match raw {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(w) if w.is_finite() => w,
        _ => {
            if raw.is_some() {
                debug!(weight = ?raw, "Malformed edge weight, using default");
            }
            DEFAULT_WEIGHT
        }
    }
}
