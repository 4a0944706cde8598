//! Domain Layer - hop derivation with no I/O

pub mod errors;
pub mod table;
