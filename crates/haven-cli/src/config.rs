use std::path::{Path, PathBuf};

use haven_instruments::recommend::RecommendationPolicy;
use haven_instruments::scoring::ScoringConfig;
use serde::{Deserialize, Serialize};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HavenConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Added in v1; v0 configs always used the default mapping.
    #[serde(default)]
    pub recommendation: RecommendationPolicy,
    /// Where the pre-selected plan lives. Defaults to `plan.json` next to
    /// the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_store_path: Option<PathBuf>,
}

impl Default for HavenConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            scoring: ScoringConfig::default(),
            recommendation: RecommendationPolicy::default(),
            plan_store_path: None,
        }
    }
}

impl HavenConfig {
    pub fn plan_store_path(&self, config_path: &Path) -> PathBuf {
        match &self.plan_store_path {
            Some(path) => path.clone(),
            None => config_path.with_file_name("plan.json"),
        }
    }
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("com.haven.onboarding"))
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Load and migrate the config at `path`. A missing file yields defaults.
pub fn load_config(path: &Path) -> eyre::Result<HavenConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(HavenConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: HavenConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
pub fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update haven-onboard."
        ));
    }

    // v0 → v1: `thresholds: { high, moderate }` became `scoring: { high_threshold, moderate_threshold }`
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;

        if let Some(old) = obj.remove("thresholds") {
            let mut scoring = serde_json::Map::new();
            if let Some(high) = old.get("high") {
                scoring.insert("high_threshold".to_string(), high.clone());
            }
            if let Some(moderate) = old.get("moderate") {
                scoring.insert("moderate_threshold".to_string(), moderate.clone());
            }
            obj.entry("scoring")
                .or_insert(serde_json::Value::Object(scoring));
        }
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (thresholds moved under scoring)");
    }

    Ok(json)
}

pub fn save_config(path: &Path, config: &HavenConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path {} has no parent", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
