use crate::classifier::StyleClassifier;
use crate::types::{Block, SplitResult};
use tracing::debug;

/// Route every top-level block, whole, to the bucket the classifier picks.
/// Bodies are trimmed on the way in; nested text inside grouping rules is
/// left untouched.
pub fn split_blocks(classifier: &StyleClassifier, blocks: Vec<Block>) -> SplitResult {
    let mut split = SplitResult::new();

    for block in blocks {
        let bucket = classifier.classify_block(&block);
        debug!(header = %block.header, %bucket, "routed block");
        split.push(bucket, block.with_trimmed_body());
    }

    split
}
