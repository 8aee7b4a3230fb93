pub mod config;
pub mod logger;
pub mod playlist;
pub mod server;

pub use config::*;
pub use logger::*;
pub use server::ApplicationServer;
