pub mod health_controller;
pub mod playlist_controller;
pub mod relay_controller;
