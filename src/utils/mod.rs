//! Utility modules shared by the binaries and the sync cycle.

pub mod logging;
