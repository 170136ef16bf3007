use crate::storage::Storage;
use crate::types::{Block, Bucket, SplitResult};
use anyhow::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::info;

/// What was written for one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketOutput {
    pub bucket: Bucket,
    pub path: PathBuf,
    pub block_count: usize,
    pub bytes: usize,
    pub sha256: String,
}

pub fn render_block(block: &Block) -> String {
    format!("{} {{\n{}\n}}", block.header, block.body)
}

/// Blocks separated by a blank line, ending in exactly one newline.
/// An empty bucket renders as a lone newline.
pub fn render_bucket(blocks: &[Block]) -> String {
    let joined = blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{}\n", joined.trim_end())
}

/// Write `<bucket>.css` into `output_dir` for every bucket, in enumeration order.
pub fn write_buckets(
    split: &SplitResult,
    output_dir: &Path,
    storage: &dyn Storage,
) -> Result<Vec<BucketOutput>> {
    storage.create_dir_all(output_dir)?;

    let mut outputs = Vec::with_capacity(Bucket::ALL.len());
    for (bucket, blocks) in split.iter() {
        let path = output_dir.join(bucket.file_name());
        let contents = render_bucket(blocks);
        storage.write(&path, &contents)?;
        info!(%bucket, blocks = blocks.len(), path = %path.display(), "wrote stylesheet");

        outputs.push(BucketOutput {
            bucket,
            path,
            block_count: blocks.len(),
            bytes: contents.len(),
            sha256: content_hash(&contents),
        });
    }

    Ok(outputs)
}

pub fn content_hash(contents: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents.as_bytes());
    format!("{:x}", hasher.finalize())
}
