// SPDX-License-Identifier: GPL-3.0-only

//! Storage utilities for captured photos

use crate::errors::PhotoError;
use crate::pipelines::photo::EncodedImage;
use crate::upload::generate_filename;
use std::path::PathBuf;
use tracing::{debug, info};

/// Directory photos are saved to unless told otherwise
pub fn default_photo_dir(save_folder: &str) -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(save_folder)
}

/// Save an encoded photo under a generated name in `output_dir`
///
/// The directory is created if needed. Returns the written path.
pub async fn save_photo(encoded: EncodedImage, output_dir: PathBuf) -> Result<PathBuf, PhotoError> {
    let filename = generate_filename(encoded.format.extension());
    let path = output_dir.join(&filename);

    debug!(path = %path.display(), size = encoded.data.len(), "Saving photo");

    let write_path = path.clone();
    tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&output_dir)?;
        std::fs::write(&write_path, &encoded.data)?;
        Ok::<_, PhotoError>(())
    })
    .await
    .map_err(|e| PhotoError::SaveFailed(format!("Save task error: {}", e)))??;

    info!(path = %path.display(), "Photo written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::photo::EncodingFormat;

    #[tokio::test]
    async fn test_save_photo_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let encoded = EncodedImage {
            data: vec![1, 2, 3],
            format: EncodingFormat::Png,
            width: 1,
            height: 1,
        };

        let path = save_photo(encoded, dir.path().join("nested")).await.unwrap();
        assert_eq!(path.extension().unwrap(), "png");
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_default_dir_uses_folder_name() {
        assert!(default_photo_dir("Bodysnap").ends_with("Bodysnap"));
    }
}
