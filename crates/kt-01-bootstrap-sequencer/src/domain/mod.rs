//! Domain Layer - Pure bootstrap ordering logic with no I/O

pub mod errors;
pub mod plan;
