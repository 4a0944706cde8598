//! Domain Layer - trial bookkeeping with no I/O

pub mod errors;
pub mod tally;
