pub mod api;
pub mod media_bridge;
