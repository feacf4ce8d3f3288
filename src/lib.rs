pub mod app;
pub mod config;
pub mod favourites;
pub mod models;
pub mod render;
pub mod sanitize;
pub mod selection;
pub mod session;
pub mod store;
pub mod tvmaze;
