pub mod renderer;

pub use renderer::{Renderer, status_label};
