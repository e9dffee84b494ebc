pub mod file;

pub use file::{read_records, render_report, write_report};
