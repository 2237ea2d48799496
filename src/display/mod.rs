pub mod dot;

pub use dot::{build_dot, write_dot_file, RenderError};
