// Stylesplit Core Library
//
// Splits a monolithic stylesheet into page-scoped stylesheets and rewrites
// the imports that pointed at it. Main interface is `MigrationProcessor`.

pub mod types;
pub mod parser;
pub mod classifier;
pub mod splitter;
pub mod serializer;
pub mod rewriter;
pub mod storage;
pub mod config;
pub mod processor;

// Re-export main types and functions for easy use
pub use types::*;
pub use parser::{parse_blocks, BlockScanner};
pub use classifier::StyleClassifier;
pub use splitter::split_blocks;
pub use serializer::{render_block, render_bucket, BucketOutput};
pub use config::{ConfigError, MigrationConfig};
pub use processor::{MigrationProcessor, MigrationReport, PipelineStages, StepProfiler};
pub use storage::{DryRunStorage, FileStorage, Storage};
