//! Concrete typed tables
//!
//! Adapters for the tables and accessors used when wiring bridges, ports
//! and managers.

pub mod hardware_vtep;
pub mod open_vswitch;

pub use hardware_vtep::Manager;
pub use open_vswitch::{Bridge, Controller, Interface, OpenVSwitch, Port};
