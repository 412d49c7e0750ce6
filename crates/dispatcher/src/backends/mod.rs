//! Backend implementations
//!
//! Contains SimulatedBackend, the configurable stand-in for a real lookup.

mod simulated;

pub use self::simulated::SimulatedBackend;
