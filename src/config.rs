use clap::Parser;
use std::path::PathBuf;

pub const CATALOG_PATH: &str = "data/activities.csv";
pub const IMPORT_DIR: &str = "data/files";
pub const OUTPUT_DIR: &str = "data/activity";
pub const DEFAULT_SPORT: &str = "RUNNING";

/// Convert catalogued FIT/TCX activities into GeoJSON features.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// CSV catalog: id, startTime, name, totalMeters, totalSeconds
    #[arg(long, default_value = CATALOG_PATH)]
    pub catalog: PathBuf,

    /// Directory searched (recursively) for `<id>.fit`, `<id>.fit.gz` and `<id>.tcx`
    #[arg(long, default_value = IMPORT_DIR)]
    pub import_dir: PathBuf,

    /// Directory receiving one `<id>.geojson` per imported activity
    #[arg(long, default_value = OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Sport picked out of multi-activity TCX files
    #[arg(long, default_value = DEFAULT_SPORT)]
    pub sport: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    pub catalog_path: PathBuf,
    pub import_dir: PathBuf,
    pub output_dir: PathBuf,
    pub sport: String,
}

impl ImportConfig {
    pub fn output_path(&self, activity_id: i64) -> PathBuf {
        self.output_dir.join(format!("{activity_id}.geojson"))
    }
}

impl From<Args> for ImportConfig {
    fn from(args: Args) -> Self {
        ImportConfig {
            catalog_path: args.catalog,
            import_dir: args.import_dir,
            output_dir: args.output_dir,
            sport: args.sport.to_ascii_uppercase(),
        }
    }
}
