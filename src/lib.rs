//! Customer churn dashboard.
//!
//! Loads a churn dataset once, then serves a web page whose four filter
//! controls drive seven charts.  Every control change submits the full
//! [`FilterSelection`](data::filter::FilterSelection) to the
//! [`Controller`](state::Controller), which filters the dataset, runs the
//! chart builders and publishes the seven charts together.

pub mod charts;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;

pub use charts::{render, ChartBundle, ChartSpec};
pub use data::filter::{filter, Choice, FilterSelection, FilteredView};
pub use data::loader::load_file;
pub use data::model::{Dataset, Record};
pub use error::LoadError;
pub use state::Controller;
