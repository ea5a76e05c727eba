use thiserror::Error;

use crate::code::gate::Stage;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemProcessor from: {0}")]
    ItemProcessor(String),

    /// A step stopped; `source` is the error that stopped it.
    #[error("Step {name} failed: {source}")]
    Step {
        name: String,
        #[source]
        source: Box<BatchError>,
    },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A simulated approval stage turned the iteration down.
    #[error("Iteration {index} rejected at stage: {stage}")]
    Rejected { index: usize, stage: Stage },
}
