/// Web dashboard - Gateway
mod pages;
mod server;

pub use pages::{escape_html, Banner};
pub use server::{router, serve, DashboardError, DashboardState, QueryForm};
