use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::combinations::AllocatorConfig;
use crate::fixture::Slate;
use crate::model_config::ModelConfig;

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read {what} {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {what} {}", path.display()))
}

/// Reads and validates a slate document.
pub fn load_slate(path: &Path) -> Result<Slate> {
    let slate: Slate = read_json(path, "slate")?;
    slate
        .validate()
        .with_context(|| format!("invalid slate {}", path.display()))?;
    Ok(slate)
}

/// Defaults unless a path is given; the file may override any subset of fields.
pub fn load_model_config(path: Option<&Path>) -> Result<ModelConfig> {
    let Some(path) = path else {
        return Ok(ModelConfig::default());
    };
    let cfg: ModelConfig = read_json(path, "model config")?;
    cfg.validate()
        .with_context(|| format!("invalid model config {}", path.display()))?;
    Ok(cfg)
}

pub fn load_allocator_config(path: Option<&Path>) -> Result<AllocatorConfig> {
    let Some(path) = path else {
        return Ok(AllocatorConfig::default());
    };
    let cfg: AllocatorConfig = read_json(path, "allocator config")?;
    cfg.validate()
        .with_context(|| format!("invalid allocator config {}", path.display()))?;
    Ok(cfg)
}

/// Pretty JSON written next to the target and swapped in with a rename.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("combinadas-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        assert_eq!(load_model_config(None).unwrap(), ModelConfig::default());
        assert_eq!(load_allocator_config(None).unwrap(), AllocatorConfig::default());
    }

    #[test]
    fn partial_model_config_overrides_named_fields() {
        let dir = scratch_dir("model-cfg");
        let path = dir.join("model.json");
        write_json_atomic(&path, &serde_json::json!({"goals": {"rho": 0.05}})).unwrap();

        let cfg = load_model_config(Some(&path)).unwrap();
        assert_eq!(cfg.goals.rho, 0.05);
        assert_eq!(cfg.goals.max_goals, 6);
        assert_eq!(cfg.blend, ModelConfig::default().blend);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn invalid_model_config_is_rejected() {
        let dir = scratch_dir("bad-cfg");
        let path = dir.join("model.json");
        write_json_atomic(&path, &serde_json::json!({"goals": {"matches_played": 0.0}})).unwrap();
        assert!(load_model_config(Some(&path)).is_err());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn atomic_write_creates_dirs_and_leaves_no_temp() {
        let dir = scratch_dir("write");
        let path = dir.join("nested").join("out.json");
        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();

        let back: Vec<u32> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
        assert!(!path.with_extension("json.tmp").exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_slate_reports_path() {
        let err = load_slate(Path::new("/nonexistent/slate.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/slate.json"));
    }
}
