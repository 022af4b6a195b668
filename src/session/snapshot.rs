use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::Result;

/// Reference to an image parked in a temp file between a snapshot and the
/// next restoration. Consumed at most once: restoring deletes the file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedImageRef {
    pub filename: Option<PathBuf>,
}

impl SavedImageRef {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.filename.is_none()
    }
}

/// The snapshot record a host keeps across a destroy/recreate cycle. Only
/// the image's file path crosses the boundary, never the pixels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub text: String,
    pub image: SavedImageRef,
}

impl SavedState {
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}
