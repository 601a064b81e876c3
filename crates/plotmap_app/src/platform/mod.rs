pub mod app;
pub mod effects;
pub mod input;
pub mod render;
