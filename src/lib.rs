pub mod config;
pub mod error;
pub mod exercise;
pub mod geometry;
pub mod plan;
pub mod pose;
pub mod protocol;
pub mod render;
pub mod session;
