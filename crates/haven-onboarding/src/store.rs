use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use haven_core::models::PlanRecommendation;

use crate::error::StoreError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Key-value slot holding a plan the user picked before onboarding
/// (e.g. on the pricing page). Read once when a flow starts.
pub trait PlanStore: Send + Sync {
    /// None = nothing pre-selected.
    fn load_preselected(&self) -> BoxFuture<'_, Result<Option<PlanRecommendation>, StoreError>>;

    fn save_preselected<'a>(
        &'a self,
        plan: &'a PlanRecommendation,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    fn clear_preselected(&self) -> BoxFuture<'_, Result<(), StoreError>>;
}

/// A single JSON file on local disk.
pub struct JsonFilePlanStore {
    path: PathBuf,
}

impl JsonFilePlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanStore for JsonFilePlanStore {
    fn load_preselected(&self) -> BoxFuture<'_, Result<Option<PlanRecommendation>, StoreError>> {
        Box::pin(async move {
            let bytes = match tokio::fs::read(&self.path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %self.path.display(), "no pre-selected plan");
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };
            let plan: PlanRecommendation = serde_json::from_slice(&bytes)?;
            tracing::debug!(path = %self.path.display(), tier = %plan.tier, "pre-selected plan loaded");
            Ok(Some(plan))
        })
    }

    /// Atomic: write a temp file next to the target, then rename.
    fn save_preselected<'a>(
        &'a self,
        plan: &'a PlanRecommendation,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let json = serde_json::to_vec_pretty(plan)?;
            if let Some(parent) = self.path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let tmp_path = self.path.with_extension("json.tmp");
            tokio::fs::write(&tmp_path, &json).await?;
            tokio::fs::rename(&tmp_path, &self.path).await?;
            tracing::info!(path = %self.path.display(), tier = %plan.tier, "pre-selected plan saved");
            Ok(())
        })
    }

    fn clear_preselected(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            match tokio::fs::remove_file(&self.path).await {
                Ok(()) => {
                    tracing::info!(path = %self.path.display(), "pre-selected plan cleared");
                    Ok(())
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }
}
