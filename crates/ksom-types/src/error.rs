// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all K-SOM monitor failures.
///
/// The taxonomy is deliberately narrow: construction-time problems are
/// the only fatal ones. Per-cycle math never fails; degenerate inputs
/// are absorbed as clamped or default values.
#[derive(Error, Debug)]
pub enum KsomError {
    /// Configuration rejected at construction time.
    #[error("config error: {0}")]
    Config(String),

    /// Numerical error (NaN/Inf in computation).
    #[error("numerical error: {0}")]
    Numerical(String),
}

pub type KsomResult<T> = Result<T, KsomError>;
