use crate::classifier::StyleClassifier;
use crate::config::MigrationConfig;
use crate::parser::parse_blocks;
use crate::rewriter::{page_import_line, ImportRewriter};
use crate::serializer::{write_buckets, BucketOutput};
use crate::splitter::split_blocks;
use crate::storage::{DryRunStorage, FileStorage, Storage};
use crate::types::*;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

/// Summary of one migration run
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub dry_run: bool,
    pub source: PathBuf,
    pub block_count: usize,
    pub buckets: Vec<BucketOutput>,
    pub entry: EntryOutcome,
    pub pages: Vec<PageOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryOutcome {
    pub path: PathBuf,
    pub rewritten: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageOutcome {
    pub path: PathBuf,
    pub bucket: Bucket,
    pub inserted: bool,
}

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStages {
    pub blocks: Vec<Block>,
    pub split: SplitResult,
    pub report: MigrationReport,
}

/// Collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        info!(step = step_name, elapsed_us = elapsed.as_micros() as u64, "step finished");
        self.timings.push((step_name.to_string(), elapsed));

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();
        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            info!(step = %step, elapsed_us = duration.as_micros() as u64, "{percentage:.1}% of run");
        }
        info!(total_us = total.as_micros() as u64, "migration finished");
    }
}

pub struct MigrationProcessor {
    storage: Box<dyn Storage>,
    rewriter: ImportRewriter,
    dry_run: bool,
}

impl MigrationProcessor {
    /// Create a processor with an explicit storage backend
    pub fn new_with_storage(storage: Box<dyn Storage>, dry_run: bool) -> Result<Self> {
        Ok(Self {
            storage,
            rewriter: ImportRewriter::new()?,
            dry_run,
        })
    }

    /// Processor that writes to the real filesystem
    pub fn new() -> Result<Self> {
        Self::new_with_storage(Box::new(FileStorage::new()), false)
    }

    /// Processor that reads the project but keeps every write in memory
    pub fn new_dry_run() -> Result<Self> {
        Self::new_with_storage(Box::new(DryRunStorage::new()), true)
    }

    pub fn run(&self, config: &MigrationConfig) -> Result<MigrationReport> {
        self.run_with_profiler(config, &mut StepProfiler::new(false))
    }

    pub fn run_with_profiler(
        &self,
        config: &MigrationConfig,
        profiler: &mut StepProfiler,
    ) -> Result<MigrationReport> {
        Ok(self.run_stages(config, profiler)?.report)
    }

    /// Run the migration and keep the parsed blocks and split alongside the report
    pub fn run_capture_stages(
        &self,
        config: &MigrationConfig,
        profiler: &mut StepProfiler,
    ) -> Result<PipelineStages> {
        self.run_stages(config, profiler)
    }

    fn run_stages(
        &self,
        config: &MigrationConfig,
        profiler: &mut StepProfiler,
    ) -> Result<PipelineStages> {
        config.validate()?;
        let classifier = StyleClassifier::new(&config.classifier);

        // Step 1: Read the source stylesheet. Nothing is written if this fails.
        let source = config.stylesheet_path();
        let css = profiler.time_step("Read stylesheet", || self.storage.read_to_string(&source))?;
        info!(path = %source.display(), bytes = css.len(), "loaded stylesheet");

        // Step 2: Parse top-level blocks
        let blocks = profiler.time_step("Parse blocks", || parse_blocks(&css));
        info!(blocks = blocks.len(), "parsed stylesheet");

        // Step 3: Classify and split
        let split = profiler.time_step("Split blocks", || split_blocks(&classifier, blocks.clone()));

        // Step 4: Write one stylesheet per bucket
        let output_dir = config.output_dir_path();
        let buckets = profiler.time_step("Write stylesheets", || {
            write_buckets(&split, &output_dir, self.storage.as_ref())
        })?;

        // Step 5: Point the entry file at the global stylesheet
        let entry = profiler.time_step("Rewrite entry import", || self.rewrite_entry(config))?;

        // Step 6: Give each page its own stylesheet import
        let pages = profiler.time_step("Insert page imports", || self.insert_page_imports(config))?;

        profiler.log_summary();

        let report = MigrationReport {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            dry_run: self.dry_run,
            source,
            block_count: blocks.len(),
            buckets,
            entry,
            pages,
        };

        Ok(PipelineStages {
            blocks,
            split,
            report,
        })
    }

    fn rewrite_entry(&self, config: &MigrationConfig) -> Result<EntryOutcome> {
        let path = config.entry_file_path();
        let text = self.storage.read_to_string(&path)?;

        let rewritten = match self.rewriter.rewrite_entry_import(
            &text,
            &config.entry_import_from,
            &config.entry_import_to,
        ) {
            Some(updated) => {
                self.storage.write(&path, &updated)?;
                true
            }
            None => {
                warn!(
                    path = %path.display(),
                    import = %config.entry_import_from,
                    "entry import not found, leaving file unchanged"
                );
                false
            }
        };

        Ok(EntryOutcome { path, rewritten })
    }

    fn insert_page_imports(&self, config: &MigrationConfig) -> Result<Vec<PageOutcome>> {
        let mut outcomes = Vec::with_capacity(config.pages.len());

        for page in &config.pages {
            let path = config.resolve(&page.path);
            let text = self.storage.read_to_string(&path)?;
            let import_line = page_import_line(&config.page_import_base, page.bucket);

            let inserted = match self.rewriter.insert_page_import(&text, &import_line) {
                Some(updated) => {
                    self.storage.write(&path, &updated)?;
                    info!(path = %path.display(), import = %import_line, "added page import");
                    true
                }
                None => {
                    info!(path = %path.display(), "page import already present or no anchor, skipping");
                    false
                }
            };

            outcomes.push(PageOutcome {
                path,
                bucket: page.bucket,
                inserted,
            });
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiler_disabled_records_nothing() {
        let mut profiler = StepProfiler::new(false);
        let value = profiler.time_step("noop", || 7);
        assert_eq!(value, 7);
        assert!(profiler.timings().is_empty());
    }

    #[test]
    fn test_profiler_enabled_records_steps_in_order() {
        let mut profiler = StepProfiler::new(true);
        profiler.time_step("first", || ());
        profiler.time_step("second", || ());
        let names: Vec<&str> = profiler.timings().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_capture_stages_times_every_step() {
        let root = std::env::temp_dir().join(format!("stylesplit_profile_{}", Uuid::new_v4()));
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("src/App.css"), ".about-hero { color: red; }").unwrap();
        std::fs::write(root.join("src/App.tsx"), "import './App.css'\n").unwrap();
        let config = MigrationConfig {
            root: root.clone(),
            pages: Vec::new(),
            ..MigrationConfig::default()
        };

        let mut profiler = StepProfiler::new(true);
        let stages = MigrationProcessor::new_dry_run()
            .unwrap()
            .run_capture_stages(&config, &mut profiler)
            .unwrap();
        std::fs::remove_dir_all(&root).ok();

        assert_eq!(stages.blocks.len(), 1);
        let names: Vec<&str> = profiler.timings().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Read stylesheet",
                "Parse blocks",
                "Split blocks",
                "Write stylesheets",
                "Rewrite entry import",
                "Insert page imports",
            ]
        );
    }

    #[test]
    fn test_invalid_config_fails_before_reading() {
        let mut config = MigrationConfig {
            root: std::env::temp_dir().join(format!("stylesplit_invalid_{}", Uuid::new_v4())),
            ..MigrationConfig::default()
        };
        config.classifier.grouping_prefixes.push(String::new());

        let err = MigrationProcessor::new_dry_run().unwrap().run(&config).unwrap_err();
        assert!(err.to_string().contains("grouping prefix"));
    }
}
