pub mod app_settings;
pub mod app_state;
pub mod messages;
pub mod network;
pub mod period;
pub mod sections;
