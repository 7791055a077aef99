//! KMZ 生成
//!
//! KMZ は `doc.kml` を1つ含む zip。

use crate::error::Result;
use borehole_fm_common::{render_kml, MineAreaResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// KMZ 内の KML ファイル名
pub const KML_ENTRY: &str = "doc.kml";

pub fn write_kmz(result: &MineAreaResult, output: &Path) -> Result<PathBuf> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let kml = render_kml(result);
    let file = std::fs::File::create(output)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(KML_ENTRY, options)?;
    zip.write_all(kml.as_bytes())?;
    zip.finish()?;

    tracing::info!(
        path = %output.display(),
        holes = result.holes.len(),
        "Created KMZ"
    );
    Ok(output.to_path_buf())
}
