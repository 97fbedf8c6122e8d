mod app;
mod commands;
mod effects;
mod persistence;
mod render;

pub use app::{run_app, AppOptions};
