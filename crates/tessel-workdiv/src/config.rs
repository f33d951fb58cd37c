//! Work-division configuration
//!
//! Settings can come from JSON or from `TESSEL_*` environment variables:
//!
//! | Variable                   | Example            |
//! |----------------------------|--------------------|
//! | `TESSEL_BACKENDS`          | `cpu-threads,gpu-sim` |
//! | `TESSEL_BLOCK_SELECTION`   | `adaptive`         |
//! | `TESSEL_MAX_BLOCK_THREADS` | `256`              |
//! | `TESSEL_MAX_BLOCK_EXTENT`  | `64,64,1`          |

use crate::backend::BackendKind;
use crate::error::{Result, WorkDivError};
use crate::extent::Extent3;
use crate::limits::HardwareLimits;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ENV_BACKENDS: &str = "TESSEL_BACKENDS";
pub const ENV_BLOCK_SELECTION: &str = "TESSEL_BLOCK_SELECTION";
pub const ENV_MAX_BLOCK_THREADS: &str = "TESSEL_MAX_BLOCK_THREADS";
pub const ENV_MAX_BLOCK_EXTENT: &str = "TESSEL_MAX_BLOCK_EXTENT";

/// Which limits a partition is computed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockExtentSelection {
    /// Only the target back-end's current device
    Adaptive,
    /// The tightest limits across every enabled back-end
    #[default]
    Conservative,
}

impl BlockExtentSelection {
    pub const fn is_adaptive(self) -> bool {
        matches!(self, BlockExtentSelection::Adaptive)
    }
}

/// `true` selects [`BlockExtentSelection::Adaptive`]
impl From<bool> for BlockExtentSelection {
    fn from(adaptive: bool) -> Self {
        if adaptive {
            BlockExtentSelection::Adaptive
        } else {
            BlockExtentSelection::Conservative
        }
    }
}

impl fmt::Display for BlockExtentSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockExtentSelection::Adaptive => "adaptive",
            BlockExtentSelection::Conservative => "conservative",
        })
    }
}

impl FromStr for BlockExtentSelection {
    type Err = WorkDivError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adaptive" => Ok(BlockExtentSelection::Adaptive),
            "conservative" => Ok(BlockExtentSelection::Conservative),
            other => Err(WorkDivError::config(format!(
                "unknown block selection '{other}', expected 'adaptive' or 'conservative'"
            ))),
        }
    }
}

/// Settings for [`crate::WorkDivPlanner`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkDivConfig {
    /// Enabled back-ends, in order
    pub backends: Vec<BackendKind>,
    /// Default limit selection for `plan`
    pub selection: BlockExtentSelection,
    /// Extra bound folded into every computed limit
    pub limit_override: Option<HardwareLimits>,
}

impl Default for WorkDivConfig {
    fn default() -> Self {
        Self {
            backends: BackendKind::ALL.to_vec(),
            selection: BlockExtentSelection::default(),
            limit_override: None,
        }
    }
}

impl WorkDivConfig {
    /// Read overrides from the process environment on top of the defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`] with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BACKENDS) {
            config.backends = parse_backend_list(&value)?;
        }

        if let Some(value) = lookup(ENV_BLOCK_SELECTION) {
            config.selection = value.parse()?;
        }

        let max_threads = lookup(ENV_MAX_BLOCK_THREADS)
            .map(|value| parse_count(ENV_MAX_BLOCK_THREADS, &value))
            .transpose()?;
        let max_extent = lookup(ENV_MAX_BLOCK_EXTENT)
            .map(|value| parse_extent(ENV_MAX_BLOCK_EXTENT, &value))
            .transpose()?;

        if max_threads.is_some() || max_extent.is_some() {
            let limits = HardwareLimits::new(
                max_extent.unwrap_or_else(Extent3::unbounded),
                max_threads.unwrap_or(usize::MAX),
            );
            limits.validate()?;
            config.limit_override = Some(limits);
        }

        tracing::debug!(
            backends = ?config.backends,
            selection = %config.selection,
            limit_override = ?config.limit_override,
            "loaded work-division config"
        );
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| WorkDivError::config(format!("invalid JSON config: {e}")))?;
        if let Some(limits) = &config.limit_override {
            limits.validate()?;
        }
        Ok(config)
    }

    /// Fold the configured override into `limits`
    pub fn apply_override(&self, limits: HardwareLimits) -> HardwareLimits {
        match self.limit_override {
            Some(bound) => limits.tighten(bound),
            None => limits,
        }
    }
}

fn parse_backend_list(value: &str) -> Result<Vec<BackendKind>> {
    let mut kinds = Vec::new();
    for item in value.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        let kind: BackendKind = item.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

fn parse_count(var: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| WorkDivError::config(format!("{var}={value}: {e}")))
}

fn parse_extent(var: &str, value: &str) -> Result<Extent3> {
    let parts = value
        .split(',')
        .map(|part| parse_count(var, part))
        .collect::<Result<Vec<_>>>()?;
    let components: [usize; 3] = parts
        .try_into()
        .map_err(|_| WorkDivError::config(format!("{var}={value}: expected three comma-separated values")))?;
    Ok(Extent3::new(components))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = WorkDivConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, WorkDivConfig::default());
        assert_eq!(config.backends, BackendKind::ALL.to_vec());
        assert_eq!(config.selection, BlockExtentSelection::Conservative);
    }

    #[test]
    fn test_env_overrides() {
        let config = WorkDivConfig::from_lookup(lookup(&[
            (ENV_BACKENDS, "gpu-sim, cpu_threads,gpu-sim"),
            (ENV_BLOCK_SELECTION, "Adaptive"),
            (ENV_MAX_BLOCK_THREADS, "256"),
            (ENV_MAX_BLOCK_EXTENT, "64, 64, 1"),
        ]))
        .unwrap();
        assert_eq!(config.backends, vec![BackendKind::GpuSim, BackendKind::CpuThreads]);
        assert!(config.selection.is_adaptive());
        assert_eq!(
            config.limit_override,
            Some(HardwareLimits::new(Extent3::xyz(64, 64, 1), 256))
        );
    }

    #[test]
    fn test_partial_override_leaves_other_limit_unbounded() {
        let config = WorkDivConfig::from_lookup(lookup(&[(ENV_MAX_BLOCK_THREADS, "128")])).unwrap();
        assert_eq!(config.limit_override, Some(HardwareLimits::new(Extent3::unbounded(), 128)));
    }

    #[test]
    fn test_env_errors() {
        assert!(WorkDivConfig::from_lookup(lookup(&[(ENV_BACKENDS, "opencl")])).is_err());
        assert!(WorkDivConfig::from_lookup(lookup(&[(ENV_BLOCK_SELECTION, "greedy")])).is_err());
        assert!(WorkDivConfig::from_lookup(lookup(&[(ENV_MAX_BLOCK_THREADS, "lots")])).is_err());
        assert!(WorkDivConfig::from_lookup(lookup(&[(ENV_MAX_BLOCK_EXTENT, "1,2")])).is_err());
        assert!(matches!(
            WorkDivConfig::from_lookup(lookup(&[(ENV_MAX_BLOCK_THREADS, "0")])),
            Err(WorkDivError::InvalidLimits(_))
        ));
    }

    #[test]
    fn test_json() {
        let config = WorkDivConfig::from_json_str(
            r#"{"backends":["cpu-serial"],"selection":"adaptive","limit_override":{"max_block_extent":[8,8,8],"max_block_thread_count":64}}"#,
        )
        .unwrap();
        assert_eq!(config.backends, vec![BackendKind::CpuSerial]);
        assert_eq!(config.selection, BlockExtentSelection::Adaptive);

        let partial = WorkDivConfig::from_json_str(r#"{"selection":"adaptive"}"#).unwrap();
        assert_eq!(partial.backends, BackendKind::ALL.to_vec());

        assert!(WorkDivConfig::from_json_str(r#"{"threads":4}"#).is_err());
    }

    #[test]
    fn test_apply_override() {
        let config = WorkDivConfig {
            limit_override: Some(HardwareLimits::new(Extent3::xyz(64, 64, 1), 256)),
            ..WorkDivConfig::default()
        };
        let device = HardwareLimits::new(Extent3::xyz(1024, 1024, 64), 1024);
        assert_eq!(config.apply_override(device), HardwareLimits::new(Extent3::xyz(64, 64, 1), 256));
        assert_eq!(WorkDivConfig::default().apply_override(device), device);
    }

    #[test]
    fn test_selection_from_bool() {
        assert_eq!(BlockExtentSelection::from(true), BlockExtentSelection::Adaptive);
        assert_eq!(BlockExtentSelection::from(false), BlockExtentSelection::Conservative);
    }
}
