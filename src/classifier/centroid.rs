//! Nearest-centroid model artifact.
//!
//! The artifact format for trained direction models: one centroid per
//! class in the 2-feature space, nearest wins. Class order follows the
//! training schema (idle, up, down).

use crate::classifier::model::{ClassifierModel, ModelError};
use serde::{Deserialize, Serialize};

/// One trained class centroid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroidClass {
    /// Nominal class label from the training schema
    pub label: String,
    /// Centroid in (current_speed, current_pressure_speed) space
    pub centroid: [f64; 2],
}

/// Nearest-centroid classifier over the 2-feature schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroidModel {
    pub classes: Vec<CentroidClass>,
}

impl CentroidModel {
    /// A conservative built-in model for development and replay runs
    /// without a trained artifact on disk. Centroids reflect a typical
    /// passenger elevator: ~0.3 m/s sustained altitude change with the
    /// corresponding opposite-signed pressure slope.
    pub fn builtin() -> Self {
        Self {
            classes: vec![
                CentroidClass {
                    label: "idle".to_string(),
                    centroid: [0.0, 0.0],
                },
                CentroidClass {
                    label: "up".to_string(),
                    centroid: [0.3, -0.035],
                },
                CentroidClass {
                    label: "down".to_string(),
                    centroid: [-0.3, 0.035],
                },
            ],
        }
    }
}

impl ClassifierModel for CentroidModel {
    fn classify(&self, features: &[f64; 2]) -> Result<usize, ModelError> {
        if self.classes.is_empty() {
            return Err(ModelError::EmptyModel);
        }

        let mut best_index = 0;
        let mut best_distance = f64::INFINITY;
        for (index, class) in self.classes.iter().enumerate() {
            let dx = features[0] - class.centroid[0];
            let dy = features[1] - class.centroid[1];
            let distance = dx * dx + dy * dy;
            if !distance.is_finite() {
                return Err(ModelError::NonFiniteScore);
            }
            if distance < best_distance {
                best_distance = distance;
                best_index = index;
            }
        }
        Ok(best_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_separates_directions() {
        let model = CentroidModel::builtin();
        assert_eq!(model.classify(&[0.0, 0.0]).unwrap(), 0);
        assert_eq!(model.classify(&[0.5, -0.05]).unwrap(), 1);
        assert_eq!(model.classify(&[-0.5, 0.05]).unwrap(), 2);
    }

    #[test]
    fn test_empty_model_errors() {
        let model = CentroidModel { classes: vec![] };
        assert!(matches!(
            model.classify(&[0.0, 0.0]),
            Err(ModelError::EmptyModel)
        ));
    }

    #[test]
    fn test_artifact_roundtrip() {
        let model = CentroidModel::builtin();
        let json = serde_json::to_string(&model).unwrap();
        let back: CentroidModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.classes.len(), 3);
        assert_eq!(back.classes[1].label, "up");
    }
}
