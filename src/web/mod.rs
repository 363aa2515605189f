pub mod handlers;
pub mod models;
pub mod server;

pub use models::AppState;
pub use server::{configure, run_server};
