//! Registry and lifecycle controller for a fleet of locally supervised
//! OpenClaw gateway profiles.

pub mod cli;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod registry;

pub use error::{RegistryError, Result};
pub use registry::GatewayRegistry;
