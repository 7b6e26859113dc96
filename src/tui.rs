//! Terminal user interface.

mod app;
mod screens;

pub use app::run;
