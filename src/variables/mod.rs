//! Variables module for the case runner
//!
//! This module provides the shared variable store and the `${name}`
//! placeholder resolver that reads from it.

pub mod store;
pub mod substitution;

pub use store::VariableStore;
pub use substitution::{ParameterResolver, ResolveScope};
