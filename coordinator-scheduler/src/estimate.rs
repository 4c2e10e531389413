//! Crude VRAM sizing heuristic based on model-name suffix tokens.

/// Estimates the VRAM, in megabytes, a model of the given name requires.
///
/// Deliberately coarse: matches the last `_`/`-`-delimited token against a
/// small suffix table and falls back to a conservative default otherwise.
#[must_use]
pub fn estimated_vram_requirement(model: &str) -> i64 {
    let upper = model.to_ascii_uppercase();
    if upper.contains("13B") {
        10240
    } else if upper.contains("7B") {
        6144
    } else if upper.contains("1B") {
        2048
    } else {
        4096
    }
}
