use crate::activity::Activity;
use crate::catalog::{CatalogError, load_catalog};
use crate::config::ImportConfig;
use crate::feature::assemble;
use crate::io::{read_input, write_feature_geojson};
use crate::parsers::{ParseError, Parser, fit::FitParser, tcx::TcxParser};
use indicatif::ProgressIterator;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Fit,
    Tcx,
}

impl InputKind {
    fn parser(self) -> Box<dyn Parser> {
        match self {
            InputKind::Fit => Box::new(FitParser),
            InputKind::Tcx => Box::new(TcxParser),
        }
    }
}

/// Input files found for one activity id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFiles {
    pub fit: Option<PathBuf>,
    pub tcx: Option<PathBuf>,
}

impl InputFiles {
    /// FIT always wins over TCX.
    pub fn preferred(&self) -> Option<(InputKind, &Path)> {
        match (&self.fit, &self.tcx) {
            (Some(fit), _) => Some((InputKind::Fit, fit)),
            (None, Some(tcx)) => Some((InputKind::Tcx, tcx)),
            (None, None) => None,
        }
    }
}

/// `<id>.fit`, `<id>.fit.gz` or `<id>.tcx`, case-insensitive.
fn classify(file_name: &str) -> Option<(i64, InputKind)> {
    let lower = file_name.to_ascii_lowercase();
    let (stem, kind) = if let Some(stem) = lower.strip_suffix(".fit.gz") {
        (stem, InputKind::Fit)
    } else if let Some(stem) = lower.strip_suffix(".fit") {
        (stem, InputKind::Fit)
    } else if let Some(stem) = lower.strip_suffix(".tcx") {
        (stem, InputKind::Tcx)
    } else {
        return None;
    };
    stem.parse().ok().map(|id| (id, kind))
}

pub fn index_inputs(import_dir: &Path) -> HashMap<i64, InputFiles> {
    let mut index: HashMap<i64, InputFiles> = HashMap::new();

    for entry in WalkDir::new(import_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
    {
        let file_name = entry.file_name().to_str().unwrap_or("");
        let Some((id, kind)) = classify(file_name) else {
            continue;
        };
        let files = index.entry(id).or_default();
        let slot = match kind {
            InputKind::Fit => &mut files.fit,
            InputKind::Tcx => &mut files.tcx,
        };
        if let Some(existing) = slot.as_deref() {
            warn!(
                "ignoring {}, already using {}",
                entry.path().display(),
                existing.display()
            );
        } else {
            *slot = Some(entry.into_path());
        }
    }

    index
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    MissingActivityId,
    NoInputFile,
    DecodeFailed,
    NoMatchingSport,
}

#[derive(Debug, PartialEq)]
pub enum ImportOutcome {
    Written(PathBuf),
    Skipped(SkipReason),
    Failed,
}

#[derive(Debug, Default)]
pub struct ImportStats {
    pub written: usize,
    pub failed: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl ImportStats {
    fn record(&mut self, outcome: &ImportOutcome) {
        match outcome {
            ImportOutcome::Written(_) => self.written += 1,
            ImportOutcome::Failed => self.failed += 1,
            ImportOutcome::Skipped(reason) => *self.skipped.entry(*reason).or_default() += 1,
        }
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn print(&self) {
        info!(
            "wrote {} features, skipped {}, failed {}",
            self.written,
            self.skipped_total(),
            self.failed
        );
        for (reason, count) in &self.skipped {
            info!("  {:?}: {}", reason, count);
        }
    }
}

/// Imports one catalog entry at a time, fully sequentially.
pub struct BatchImport {
    config: ImportConfig,
    inputs: HashMap<i64, InputFiles>,
}

impl BatchImport {
    pub fn new(config: ImportConfig) -> Self {
        let inputs = index_inputs(&config.import_dir);
        info!(
            "Found input files for {} activities in {}",
            inputs.len(),
            config.import_dir.display()
        );
        BatchImport { config, inputs }
    }

    pub fn run(&self) -> Result<ImportStats, CatalogError> {
        let catalog = load_catalog(&self.config.catalog_path)?;
        info!(
            "Loaded {} catalog records from {}",
            catalog.len(),
            self.config.catalog_path.display()
        );

        let mut stats = ImportStats::default();
        for record in catalog.into_iter().progress() {
            let outcome = self.import_record(record);
            stats.record(&outcome);
        }

        Ok(stats)
    }

    pub fn import_record(&self, mut record: Activity) -> ImportOutcome {
        let Some(id) = record.activity_id else {
            warn!("skipping catalog record without an id: {:?}", record.name);
            return ImportOutcome::Skipped(SkipReason::MissingActivityId);
        };

        let Some((kind, path)) = self.inputs.get(&id).and_then(InputFiles::preferred) else {
            debug!("no input file for activity {}", id);
            return ImportOutcome::Skipped(SkipReason::NoInputFile);
        };

        let parsed = match self.parse_input(kind, path) {
            Ok(activities) => activities,
            Err(reason) => return ImportOutcome::Skipped(reason),
        };

        record.sport = parsed.sport;
        record.track = parsed.track;

        let feature = match assemble(&record) {
            Ok(feature) => feature,
            Err(e) => {
                error!("activity {}: {}", id, e);
                return ImportOutcome::Failed;
            }
        };

        let output_path = self.config.output_path(id);
        match write_feature_geojson(feature, &output_path) {
            Ok(()) => ImportOutcome::Written(output_path),
            Err(e) => {
                error!("✗ Error writing {}: {}", output_path.display(), e);
                ImportOutcome::Failed
            }
        }
    }

    fn parse_input(&self, kind: InputKind, path: &Path) -> Result<Activity, SkipReason> {
        let parser = kind.parser();
        let parsed = read_input(path)
            .map_err(ParseError::from)
            .and_then(|bytes| parser.parse(&bytes));

        let activities = match parsed {
            Ok(activities) => activities,
            Err(e) => {
                error!("✗ {} failed on {}: {}", parser.name(), path.display(), e);
                return Err(SkipReason::DecodeFailed);
            }
        };

        match kind {
            InputKind::Fit => activities.into_iter().next().ok_or(SkipReason::DecodeFailed),
            InputKind::Tcx => activities
                .into_iter()
                .find(|a| a.sport.as_deref() == Some(self.config.sport.as_str()))
                .ok_or_else(|| {
                    debug!("no {} activity in {}", self.config.sport, path.display());
                    SkipReason::NoMatchingSport
                }),
        }
    }
}
