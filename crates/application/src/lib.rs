//! Fathom Application Layer
//!
//! The streaming pipeline between the search executor and the HTTP
//! transport, plus the ports it consumes from the outside world.
pub mod ports;
pub mod streaming;
