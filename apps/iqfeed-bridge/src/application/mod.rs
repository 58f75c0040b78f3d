//! Application Layer
//!
//! Port definitions that the vendor transport bindings and the
//! platform composition root implement.

/// Port interfaces for the vendor transport and session collaborators.
pub mod ports;
