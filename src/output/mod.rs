//! Result aggregation, persistence and reporting

mod combine;
mod persist;
mod report;

pub use combine::{combine, combine_nodes};
pub use persist::{latest_result_file, load_results, save_results};
pub use report::{print_report, RunReport};
