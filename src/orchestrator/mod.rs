//! Application-level orchestration.
//!
//! The controller owns every backend call: UI layers send `BackendCommand`s and receive
//! `BackendEvent`s, so no presentation code touches the network directly.

mod controller;

pub(crate) use controller::run_controller;
