mod console;
mod export;

pub use console::ConsoleReporter;
pub use export::{HtmlExporter, JsonExporter};
