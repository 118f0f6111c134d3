use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::spec::ModuleSpec;

/// Filesystem layout of the backend being scaffolded.
///
/// All paths are derived from one root so tests can point the whole tool at
/// a temp directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectLayout {
    pub backend_root: Utf8PathBuf,
}

impl ProjectLayout {
    pub fn new(backend_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            backend_root: backend_root.into(),
        }
    }

    /// Flat directory of legacy service implementations.
    pub fn services_dir(&self) -> Utf8PathBuf {
        self.backend_root.join("src/services")
    }

    pub fn modules_dir(&self) -> Utf8PathBuf {
        self.backend_root.join("src/modules")
    }

    pub fn module_dir(&self, spec: &ModuleSpec) -> Utf8PathBuf {
        self.modules_dir().join(&spec.name)
    }

    pub fn types_file(&self, spec: &ModuleSpec) -> Utf8PathBuf {
        self.module_dir(spec).join(format!("{}.types.ts", spec.name))
    }

    pub fn barrel_file(&self, spec: &ModuleSpec) -> Utf8PathBuf {
        self.module_dir(spec).join("index.ts")
    }

    pub fn service_file(&self, spec: &ModuleSpec) -> Utf8PathBuf {
        self.module_dir(spec)
            .join(format!("{}.service.ts", spec.name))
    }

    pub fn legacy_service_file(&self, spec: &ModuleSpec) -> Option<Utf8PathBuf> {
        spec.legacy_source
            .as_ref()
            .map(|file| self.services_dir().join(file))
    }

    /// The single shared resolver aggregator file.
    pub fn aggregator_file(&self) -> Utf8PathBuf {
        self.backend_root.join("src/schema/resolvers/index.ts")
    }
}
