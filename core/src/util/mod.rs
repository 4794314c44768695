mod duration;
mod project;

pub use duration::{format_duration, format_precise};
pub use project::{project_name, sanitize_project_name};
