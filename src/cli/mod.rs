pub mod example;
pub mod init;
pub mod query;
pub mod sdl;
pub mod validate;
