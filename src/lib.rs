pub mod batch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod normalizer;
pub mod output;
pub mod parsers;
pub mod prompt;
pub mod report;
pub mod selector;
pub mod source;

pub use batch::{BatchSummary, Pipeline, SelectMode, SingleReport};
pub use config::Config;
pub use dataset::{Dataset, RawValue};
pub use error::{DatasetError, ParseError};
pub use normalizer::{Normalizer, convert_single};
pub use selector::ColumnSelector;
