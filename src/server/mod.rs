pub mod config;
mod http_layers;
pub mod metrics;
pub mod router;
pub mod server;
pub mod state;
pub mod transport;

pub use config::ServerConfig;
pub use http_layers::*;
pub use router::{SessionRouter, SessionTable};
pub use server::{make_app, run_server};
pub use transport::SESSION_HEADER;
