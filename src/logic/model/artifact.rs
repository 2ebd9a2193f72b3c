//! Model Artifacts - Versioned, Checksummed Persistence
//!
//! A trained model is written as a JSON envelope:
//! `{kind, feature_version, layout_hash, trained_at, samples, checksum, model}`.
//! Loading rejects an envelope whose feature layout or checksum does not
//! match, so a stale or tampered model never reaches the pipeline.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::{IsolationForest, ModelResult, RandomForest};
use crate::logic::error::PipelineResult;
use crate::logic::features::layout::{layout_hash, validate_layout, LayoutMismatchError, FEATURE_VERSION};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("Artifact checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Artifact kind mismatch: expected {expected}, got {actual}")]
    KindMismatch { expected: String, actual: String },
}

// ============================================================================
// ENVELOPE
// ============================================================================

/// Model family that can be stored as an artifact
pub trait PersistableModel: Serialize + DeserializeOwned {
    const KIND: &'static str;
}

impl PersistableModel for IsolationForest {
    const KIND: &'static str = "isolation_forest";
}

impl PersistableModel for RandomForest {
    const KIND: &'static str = "random_forest";
}

/// On-disk model envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact<M> {
    pub kind: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub trained_at: DateTime<Utc>,
    /// Training rows the model saw
    pub samples: usize,
    /// SHA-256 (hex) of the serialized model body
    pub checksum: String,
    pub model: M,
}

impl<M: PersistableModel> ModelArtifact<M> {
    /// Kind, layout and checksum checks
    pub fn verify(&self) -> Result<(), ArtifactError> {
        if self.kind != M::KIND {
            return Err(ArtifactError::KindMismatch {
                expected: M::KIND.to_string(),
                actual: self.kind.clone(),
            });
        }

        validate_layout(self.feature_version, self.layout_hash)?;

        let actual = model_checksum(&self.model)?;
        if actual != self.checksum {
            return Err(ArtifactError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }
}

/// SHA-256 hex digest of the compact JSON form of a model
pub fn model_checksum<M: Serialize>(model: &M) -> Result<String, ArtifactError> {
    let body = serde_json::to_vec(model)?;
    Ok(hex::encode(Sha256::digest(&body)))
}

// ============================================================================
// STORAGE
// ============================================================================

/// Save a model to disk
pub fn save_model<M: PersistableModel>(model: &M, samples: usize, path: &Path) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let artifact = ModelArtifact {
        kind: M::KIND.to_string(),
        feature_version: FEATURE_VERSION,
        layout_hash: layout_hash(),
        trained_at: Utc::now(),
        samples,
        checksum: model_checksum(model)?,
        model,
    };

    let json = serde_json::to_vec_pretty(&artifact)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a model from disk with validation
pub fn load_model<M: PersistableModel>(path: &Path) -> Result<ModelArtifact<M>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("model artifact not found: {}", path.display()),
        )));
    }

    let data = fs::read(path)?;
    let artifact: ModelArtifact<M> = serde_json::from_slice(&data)?;
    artifact.verify()?;

    Ok(artifact)
}

// ============================================================================
// LOAD OR TRAIN
// ============================================================================

/// Where a model in memory came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Verified artifact from disk
    Loaded,
    /// Trained in this process, not validated yet
    Trained,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Loaded => "loaded",
            Provenance::Trained => "trained",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Load a verified artifact, or train (and save) a fresh model
///
/// `train` returns the fitted model and the number of training rows.
/// An unreadable artifact is logged and replaced by retraining; a failed
/// save after training is logged and the fresh model is still returned.
pub fn load_or_train<M, F>(path: &Path, train: F) -> PipelineResult<(M, Provenance)>
where
    M: PersistableModel,
    F: FnOnce() -> ModelResult<(M, usize)>,
{
    if path.exists() {
        match load_model::<M>(path) {
            Ok(artifact) => {
                log::info!(
                    "Loaded {} ({} samples, trained {})",
                    path.display(),
                    artifact.samples,
                    artifact.trained_at
                );
                return Ok((artifact.model, Provenance::Loaded));
            }
            Err(e) => log::warn!("Discarding model artifact {}: {}", path.display(), e),
        }
    } else {
        log::info!("No model artifact at {}, training", path.display());
    }

    let (model, samples) = train()?;

    match save_model(&model, samples, path) {
        Ok(()) => log::info!("Saved {} model to {}", M::KIND, path.display()),
        Err(e) => log::warn!("Failed to save model to {}: {}", path.display(), e),
    }

    Ok((model, Provenance::Trained))
}
