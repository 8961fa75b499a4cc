use crate::atlas::domain::atlas::{Atlas, AtlasError};

/// Save/load contract for the face atlas. The on-disk format is private to
/// the implementation.
pub trait AtlasStore: Send {
    fn exists(&self) -> bool;
    fn load(&self) -> Result<Atlas, AtlasError>;
    fn save(&self, atlas: &Atlas) -> Result<(), AtlasError>;
}
