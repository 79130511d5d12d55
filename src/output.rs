use std::path::{Path, PathBuf};

use tokio::{
    fs,
    io::{AsyncWriteExt, BufWriter},
};

use crate::{Error, Spell};

/// Serialize the catalog to `<dir>/spells.json`, creating `dir` if absent.
///
/// The document goes through a temp file in the target directory and is
/// renamed over `spells.json`, so a crash mid-write never leaves a truncated
/// catalog behind.
pub async fn save_catalog(spells: &[Spell], dir: impl AsRef<Path>) -> Result<PathBuf, Error> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).await?;
    let path = dir.join("spells.json");
    let json = serde_json::to_vec_pretty(spells)?;

    let tmp = match tempfile::NamedTempFile::new_in(dir) {
        Ok(tmp) => tmp,
        Err(e) => {
            tracing::warn!(error = %e, "failed to create temporary file, writing to target directly");
            fs::write(&path, &json).await?;
            return Ok(path);
        }
    };
    let (tmp_file, tmp_path) = tmp.into_parts();
    let mut writer = BufWriter::new(fs::File::from_std(tmp_file));
    writer.write_all(&json).await?;
    writer.flush().await?;
    drop(writer);
    if let Err(e) = fs::rename(&tmp_path, &path).await {
        tracing::warn!(error = %e, "couldn't move catalog into place, writing to target directly");
        fs::write(&path, &json).await?;
    }
    Ok(path)
}
