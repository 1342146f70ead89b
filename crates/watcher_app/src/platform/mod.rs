mod app;
mod config;
mod credential;
mod interrupt;
mod logging;
mod progress;

pub use app::run_app;
