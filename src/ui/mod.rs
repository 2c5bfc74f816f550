//! egui rendering. Everything here reads from [`crate::state::AppState`] and
//! only writes back through its request methods.

pub mod panels;
pub mod plot;
pub mod tables;
pub mod views;
