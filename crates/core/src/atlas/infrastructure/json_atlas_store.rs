use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::atlas::domain::atlas::{Atlas, AtlasError};
use crate::atlas::domain::atlas_store::AtlasStore;

/// Stores the atlas as a single JSON document.
///
/// Writes go to a sibling `.part` file that is renamed into place, so an
/// interrupted save never leaves a truncated atlas behind.
pub struct JsonAtlasStore {
    path: PathBuf,
}

impl JsonAtlasStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AtlasStore for JsonAtlasStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<Atlas, AtlasError> {
        let file = fs::File::open(&self.path).map_err(|source| AtlasError::Read {
            path: self.path.clone(),
            source,
        })?;
        let atlas: Atlas =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| AtlasError::Format {
                path: self.path.clone(),
                source,
            })?;
        log::info!(
            "Loaded {} faces from atlas {}",
            atlas.len(),
            self.path.display()
        );
        Ok(atlas)
    }

    fn save(&self, atlas: &Atlas) -> Result<(), AtlasError> {
        let write_err = |source| AtlasError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let temp_path = self.path.with_extension("part");
        let file = fs::File::create(&temp_path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, atlas).map_err(|source| AtlasError::Format {
            path: temp_path.clone(),
            source,
        })?;
        writer.flush().map_err(write_err)?;
        drop(writer);

        fs::rename(&temp_path, &self.path).map_err(write_err)?;
        log::info!("Saved {} faces to atlas {}", atlas.len(), self.path.display());
        Ok(())
    }
}
