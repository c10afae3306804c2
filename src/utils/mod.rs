#[macro_use]
pub mod macros;
pub mod global_config;
