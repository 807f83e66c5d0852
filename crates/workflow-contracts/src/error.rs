use thiserror::Error;

/// Shared validation failure, reusable by any crate that needs to report a
/// contract violation without owning its own bespoke variant for it.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },
}
