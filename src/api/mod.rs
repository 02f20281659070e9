pub mod response;
pub mod routes;

// Re-export route handlers for convenience
pub use routes::authors;
pub use routes::blogs;
pub use routes::music;
pub use routes::podcasts;
