//! Session adapters.
//!
//! - `StaticConnectivity` - Connectivity set by the connection manager
//! - `ConnectivitySessionResolver` - Resolves sessions from a connectivity provider

mod connectivity_resolver;
mod static_connectivity;

pub use connectivity_resolver::ConnectivitySessionResolver;
pub use static_connectivity::StaticConnectivity;
