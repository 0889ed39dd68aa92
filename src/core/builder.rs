use std::path::PathBuf;
use std::sync::Arc;

use super::engine::Engine;
use crate::{
    config::Config,
    io::{ImageStore, PgmStore},
};

/// Default directory the PGM store reads input images from.
pub const DEFAULT_IMAGES_DIR: &str = "images";

/// Default directory the PGM store writes snapshots to.
pub const DEFAULT_OUT_DIR: &str = "out";

/// Builder for constructing an [`Engine`].
pub struct EngineBuilder {
    cfg: Config,
    store: Option<Arc<dyn ImageStore>>,
}

impl EngineBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self { cfg, store: None }
    }

    /// Sets the image store the I/O collaborator persists through.
    pub fn with_store(mut self, store: Arc<dyn ImageStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Uses PGM files: input from `images`, snapshots into `out`.
    pub fn with_pgm_dirs(self, images: impl Into<PathBuf>, out: impl Into<PathBuf>) -> Self {
        self.with_store(Arc::new(PgmStore::new(images, out)))
    }

    /// Builds the engine.
    ///
    /// Without a store, PGM files under `images/` and `out/` are used.
    pub fn build(self) -> Engine {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(PgmStore::new(DEFAULT_IMAGES_DIR, DEFAULT_OUT_DIR)));
        Engine::new_internal(self.cfg, store)
    }
}
