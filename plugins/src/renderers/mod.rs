mod jsonl;
mod style;
mod text;

pub use jsonl::JsonlRenderer;
pub use style::Painter;
pub use text::TextRenderer;
