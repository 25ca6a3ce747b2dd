//! Function libraries used by tests: `math`, `string`, `list`,
//! `side-effects` and `test`.

use std::sync::Arc;

use plexus_api_core::FunctionRepository;

pub mod list;
pub mod math;
pub mod side_effects;
pub mod string;

pub use side_effects::SideEffects;

/// A repository with every fixture library. Side-effecting functions record
/// into `effects`.
pub fn repository(effects: &Arc<SideEffects>) -> FunctionRepository {
    FunctionRepository::new()
        .with_library(math::library())
        .with_library(string::library())
        .with_library(list::library())
        .with_library(side_effects::library(effects.clone()))
        .with_library(test::library())
}
