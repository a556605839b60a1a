//! Output side of a run: text log, result dumps and outcome histograms
//!
//! Nothing in here feeds back into the simulation; these writers only
//! consume a finished `SimulationOutcome`.

pub mod histogram;
pub mod results;
pub mod summary;

pub use histogram::{write_histograms, Histogram};
pub use results::write_trial_results;
pub use summary::{append_summary, render_summary, write_summary_json, SUMMARY_FILE};
