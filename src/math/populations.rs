//! Two-state equilibrium populations.
//!
//! For an unfolding free energy `ΔG` and thermal energy `RT`:
//!
//! - `K  = exp(-ΔG / RT)`
//! - `ff = 1 / (1 + K)` (folded)
//! - `fu = K / (1 + K)` (unfolded)
//!
//! Numerical notes:
//! - Evaluating `K` directly overflows once `-ΔG/RT > ~709`, giving `inf/inf = NaN`
//!   for `fu`. We evaluate the logistic in whichever form keeps the exponent
//!   non-positive, so both fractions saturate cleanly to 0 or 1.
//! - `ff + fu == 1` up to rounding for every finite input.

/// Folded and unfolded fractions for `z = -ΔG / RT` (i.e. `ln K`).
pub fn two_state_fractions(ln_k: f64) -> (f64, f64) {
    if ln_k.is_nan() {
        return (f64::NAN, f64::NAN);
    }

    if ln_k > 0.0 {
        // K > 1: use e = 1/K = exp(-z) ∈ (0, 1).
        let e = (-ln_k).exp();
        let fu = 1.0 / (1.0 + e);
        (e * fu, fu)
    } else {
        // K <= 1: e = K ∈ [0, 1].
        let e = ln_k.exp();
        let ff = 1.0 / (1.0 + e);
        (ff, e * ff)
    }
}
