pub mod browser;
mod error;
mod extractor;
pub mod filename;
pub mod input;
mod processor;
pub mod tracing;

pub use error::{ExtractError, PipelineError};
pub use extractor::{ClipExtractor, DownloadTask, ExtractTimeouts};
pub use processor::{
    builder::ClipProcessorBuilder, ChannelOutcome, ChannelReport, ClipFailure, ClipLimit,
    ClipProcessor, RunConfig, RunReport,
};
