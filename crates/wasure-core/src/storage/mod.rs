pub mod results;

pub use results::{load_results, results_path, save_results};
