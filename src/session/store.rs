use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tempfile::Builder;
use tracing::{debug, warn};

use super::error::Result;
use super::snapshot::SavedImageRef;

/// Side channel for the non-serializable image field: parks pixels in a
/// uniquely named temp file at snapshot time so that only the path has to
/// travel through the host's saved-state record.
///
/// The store owns each file exclusively from creation until the consuming
/// restore. Snapshots that are never restored leave their file behind for
/// the cache directory's reaper.
pub struct ImageStore {
    cache_dir: PathBuf,
}

impl ImageStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Encode the image to PNG in a freshly created temp file and return a
    /// ref carrying its path. Each call creates a new file; files from
    /// earlier snapshots are left alone.
    pub fn save(&self, image: &DynamicImage) -> Result<SavedImageRef> {
        fs::create_dir_all(&self.cache_dir)?;

        let mut png: Vec<u8> = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let tmp = Builder::new()
            .prefix("image-")
            .suffix(".png")
            .tempfile_in(&self.cache_dir)?;
        fs::write(tmp.path(), &png)?;
        let (_file, path) = tmp.keep().map_err(|e| e.error)?;

        debug!(path = %path.display(), bytes = png.len(), "Saved image snapshot");
        Ok(SavedImageRef {
            filename: Some(path),
        })
    }

    /// Consume a ref: load the image it points at and delete the file.
    /// Deletion is best-effort and happens regardless of decode success;
    /// any failure degrades to `None` rather than surfacing an error.
    pub fn restore(&self, saved: &SavedImageRef) -> Option<DynamicImage> {
        let path = saved.filename.as_deref()?;

        let loaded = image::open(path);
        let _ = fs::remove_file(path);

        match loaded {
            Ok(image) => {
                debug!(path = %path.display(), "Restored image snapshot");
                Some(image)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Failed loading saved image");
                None
            }
        }
    }
}
