pub mod app_services;
pub mod relay_services;

pub use relay_services::DynRelayService;
