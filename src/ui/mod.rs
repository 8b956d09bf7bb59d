pub mod app;
pub mod auth_screen;
pub mod center_panel;
pub mod settings;
pub mod settings_io;
pub mod stats_panel;
