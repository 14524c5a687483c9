pub mod century;
pub mod classifier;
pub mod config;
pub mod corpus_summary;
pub mod error;
pub mod export;
pub mod filter;
pub mod highlight;
pub mod loader;
pub mod lookup;
pub mod network;
pub mod pipeline;
pub mod schema;
pub mod stats;
pub mod thresholds;

pub use error::{PipelineError, Result};
pub use pipeline::{CorpusMetricsPipeline, PipelineConfig};
