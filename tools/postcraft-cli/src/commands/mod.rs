pub mod auth;
pub mod font_size;
pub mod import;
pub mod media;
pub mod publish;
pub mod render;
pub mod scheduled;
