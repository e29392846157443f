//! Model seam for direction classification.
//!
//! The trained model is an external artifact; this module defines the
//! capability the classifier needs from it (2 features in, class index
//! out) and the provider seam through which the host supplies it.

use crate::classifier::centroid::CentroidModel;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Errors a model can raise while scoring a feature vector.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model has no classes")]
    EmptyModel,
    #[error("model produced a non-finite score")]
    NonFiniteScore,
}

/// Capability contract with the trained artifact: given the 2-feature
/// vector in schema order, return the index of the winning class.
pub trait ClassifierModel: Send + Sync {
    fn classify(&self, features: &[f64; 2]) -> Result<usize, ModelError>;
}

/// Supplies trained models by name. Consulted lazily by the classifier
/// and never again after the first successful fetch.
pub trait ModelProvider: Send {
    fn get_model(&self, name: &str) -> Option<Arc<dyn ClassifierModel>>;
}

/// Provider backed by JSON artifacts in a model directory.
///
/// `get_model("indoor-direction")` reads `<dir>/indoor-direction.json`.
/// Unreadable or malformed artifacts are logged and reported as absent,
/// leaving the fallback behavior to the classifier.
pub struct FileModelProvider {
    dir: PathBuf,
}

impl FileModelProvider {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Path a given model name resolves to.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl ModelProvider for FileModelProvider {
    fn get_model(&self, name: &str) -> Option<Arc<dyn ClassifierModel>> {
        let path = self.artifact_path(name);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "model artifact not readable");
                return None;
            }
        };
        match serde_json::from_str::<CentroidModel>(&content) {
            Ok(model) => Some(Arc::new(model)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "model artifact malformed");
                None
            }
        }
    }
}

/// Provider that hands out one fixed, already-loaded model.
pub struct StaticModelProvider {
    model: Arc<dyn ClassifierModel>,
}

impl StaticModelProvider {
    pub fn new(model: Arc<dyn ClassifierModel>) -> Self {
        Self { model }
    }

    /// Provider wrapping the built-in centroid model.
    pub fn builtin() -> Self {
        Self::new(Arc::new(CentroidModel::builtin()))
    }
}

impl ModelProvider for StaticModelProvider {
    fn get_model(&self, _name: &str) -> Option<Arc<dyn ClassifierModel>> {
        Some(self.model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_provider_loads_artifact() {
        let dir = std::env::temp_dir().join(format!("baromotion-models-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let provider = FileModelProvider::new(dir.clone());

        let json = serde_json::to_string(&CentroidModel::builtin()).unwrap();
        let mut file = std::fs::File::create(provider.artifact_path("indoor-direction")).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let model = provider.get_model("indoor-direction").unwrap();
        assert!(model.classify(&[0.0, 0.0]).is_ok());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_file_provider_missing_artifact_is_none() {
        let provider = FileModelProvider::new(PathBuf::from("/nonexistent"));
        assert!(provider.get_model("indoor-direction").is_none());
    }

    #[test]
    fn test_static_provider_always_provides() {
        let provider = StaticModelProvider::builtin();
        assert!(provider.get_model("anything").is_some());
    }
}
