//! Controller-facing infrastructure shared by the driver crates

pub mod event;
