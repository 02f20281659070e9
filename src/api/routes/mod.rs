pub mod authors;
pub mod blogs;
pub mod common;
pub mod music;
pub mod podcasts;
