pub mod cli;
pub mod extract;
mod logging;

pub use extract::{PipelineResult, extraction_pipeline};
