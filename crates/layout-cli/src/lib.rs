//! Library side of the layout command-line tool.

pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod render;
