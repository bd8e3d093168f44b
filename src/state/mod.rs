//! Connectivity state subsystem.

pub mod holder;

pub use holder::ConnectivityStateHolder;
