//! Output of aggregated lists.
//!
//! - [`lists`] - list files on disk
//! - [`terminal`] - summary table with colors

mod lists;
mod terminal;

pub use lists::{read_list, ListWriter, AGGREGATED_DIR};
pub use terminal::{format_field, print_summary, summary_row};
