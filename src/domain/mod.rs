pub mod platform;
pub mod player;
