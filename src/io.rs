use crate::feature::ActivityFeature;
use flate2::read::GzDecoder;
use geojson::Feature;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Reads an input file, inflating it first when it ends in `.gz`.
pub fn read_input(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::new();
    let file = File::open(path)?;

    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(file).read_to_end(&mut data)?;
    } else {
        let mut file = file;
        file.read_to_end(&mut data)?;
    }

    Ok(data)
}

/// Writes one GeoJSON `Feature`. The buffered bytes only reach the file on
/// flush, so a flush failure is a failed write.
pub fn write_feature_geojson(
    feature: ActivityFeature,
    output_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let feature = Feature::from(feature);
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer(&mut writer, &feature)?;

    writer.flush()?;

    let file = writer.into_inner()?;
    if let Err(e) = file.sync_all() {
        warn!("failed to sync {}: {}", output_path.display(), e);
    }
    debug!("wrote {}", output_path.display());

    Ok(())
}
