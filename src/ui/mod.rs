//! Ratatui front-end: three tabs over one `Library`, with modal forms for
//! adding and removing books.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
