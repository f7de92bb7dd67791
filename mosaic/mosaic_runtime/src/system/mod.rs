//! System-level components: start gating, configuration and capability
//! probing.

pub mod config;
pub mod gate;
pub mod probe;

pub use config::ConfigurationStore;
pub use gate::{GateState, StartGate};
pub use probe::{apply_probe, ProbeOutcome};
