//! Library exports for scrollshot.
//!
//! The capture sequencer, frame acquisition and input synthesis live here so
//! the binary, the schema dumper and the tests share one implementation.

pub mod capture;
pub mod config;
pub mod input;
pub mod notification;
pub mod overlay;
pub mod permissions;
pub mod selection;

pub use config::Config;
