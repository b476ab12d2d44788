//! CLI command handlers.

pub mod detect;
pub mod mask;
pub mod resolve;
pub mod schemas;

pub use detect::run_detect;
pub use mask::run_mask;
pub use resolve::{ResolveCommandInput, run_resolve};
pub use schemas::run_schemas;
