use thiserror::Error;

/// Reasons an asset (or a piece of one) could not be made ready.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch failed for {path}: {reason}")]
    Fetch { path: String, reason: String },
    #[error("glTF import failed: {0}")]
    Import(#[from] gltf::Error),
    #[error("glTF document has no nodes to instantiate")]
    NoScene,
    #[error("animation index {index} out of bounds for NPC: {source_path} ({available} clips)")]
    ClipOutOfRange {
        source_path: String,
        index: usize,
        available: usize,
    },
}
