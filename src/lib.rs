pub mod alphabet; // Symbol ranks for the alignment and search engines
pub mod core; // Pairwise alignment kernels and driver
pub mod defaults;
pub mod error;
pub mod index; // FM indices over text collections
pub mod options; // Command-line option bundles
pub mod search; // Approximate search with error budgets

pub use error::{Error, Result};
