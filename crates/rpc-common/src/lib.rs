//! ---
//! rpc_section: "01-core-functionality"
//! rpc_subsection: "module"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "Shared primitives consumed by licensing hosts."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
#![warn(missing_docs)]

//! Host-side primitives shared across the workspace: the typed resources
//! registry that components attach singletons to, and tracing setup.

pub mod logging;
pub mod resources;

pub use logging::{init_tracing, LogFormat, LoggingConfig};
pub use resources::Resources;
