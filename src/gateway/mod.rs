// gateway module - session-forwarding reverse proxy for the marketplace backend

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod refresh;
pub mod server;
pub mod session;
pub mod upstream;

pub use config::GatewayConfig;
pub use server::AxumServer;
pub use session::SessionCookies;
