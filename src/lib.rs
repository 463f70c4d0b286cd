pub mod app;
pub mod carousel;
pub mod config;
pub mod contact;
pub mod detail;
pub mod format;
pub mod home;
pub mod listing;
pub mod models;
pub mod query;
pub mod render;
pub mod tmdb;
