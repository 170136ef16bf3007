use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ===== BLOCKS =====
// A block is one top-level rule as it appears in the source text.
// The header is whatever precedes the opening brace (a selector list or an
// at-rule prelude), the body is everything between the matching braces.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Selector list or at-rule prelude, trimmed
    pub header: String,
    /// Raw text between the opening brace and its matching closing brace
    pub body: String,
}

impl Block {
    pub fn new(header: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            body: body.into(),
        }
    }

    /// Same block with leading/trailing whitespace removed from the body.
    pub fn with_trimmed_body(self) -> Self {
        let body = self.body.trim();
        if body.len() == self.body.len() {
            return self;
        }
        Self {
            body: body.to_string(),
            header: self.header,
        }
    }
}

// ===== BUCKETS =====

/// One of the seven output stylesheets a block can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// Shared, site-wide rules. Also the classification fallback.
    Globals,
    Home,
    Watch,
    About,
    Connect,
    Groups,
    Events,
}

impl Bucket {
    /// Fixed enumeration order used for output and reporting.
    pub const ALL: [Bucket; 7] = [
        Bucket::Globals,
        Bucket::Home,
        Bucket::Watch,
        Bucket::About,
        Bucket::Connect,
        Bucket::Groups,
        Bucket::Events,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Bucket::Globals => "globals",
            Bucket::Home => "home",
            Bucket::Watch => "watch",
            Bucket::About => "about",
            Bucket::Connect => "connect",
            Bucket::Groups => "groups",
            Bucket::Events => "events",
        }
    }

    /// File name of the stylesheet this bucket is written to, e.g. `about.css`.
    pub fn file_name(self) -> String {
        format!("{}.css", self.name())
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===== SPLIT RESULT =====

/// Blocks grouped by bucket. Every bucket is present, even when empty,
/// and blocks keep the order they had in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResult {
    buckets: HashMap<Bucket, Vec<Block>>,
}

impl Default for SplitResult {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitResult {
    pub fn new() -> Self {
        Self {
            buckets: Bucket::ALL.into_iter().map(|b| (b, Vec::new())).collect(),
        }
    }

    pub fn push(&mut self, bucket: Bucket, block: Block) {
        self.buckets.entry(bucket).or_default().push(block);
    }

    pub fn blocks(&self, bucket: Bucket) -> &[Block] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Buckets in enumeration order together with their blocks.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[Block])> + '_ {
        Bucket::ALL.into_iter().map(move |b| (b, self.blocks(b)))
    }

    pub fn total_blocks(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

impl Serialize for SplitResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(Bucket::ALL.len()))?;
        for (bucket, blocks) in self.iter() {
            map.serialize_entry(bucket.name(), blocks)?;
        }
        map.end()
    }
}
