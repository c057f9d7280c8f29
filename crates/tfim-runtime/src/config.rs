//! Sweep configuration.
//!
//! Values are resolved in this order, later sources winning:
//! 1. Built-in defaults
//! 2. YAML file (`--config`, or `~/.tfim-sweep/config.yaml` when present)
//! 3. Environment variables with the `TFIM_` prefix
//! 4. Command-line flags (applied by the caller)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::program::{Spsa, Su2Layout};
use crate::service::BackendFilter;
use crate::sweep::FieldSweep;

/// Everything the sweep driver needs besides the service itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Register width of the model and the ansatz.
    #[serde(default = "default_num_qubits")]
    pub num_qubits: usize,

    /// Longitudinal bias field `h_z`.
    #[serde(default = "default_h_bias")]
    pub h_bias: f64,

    /// Nearest-neighbour coupling `J`.
    #[serde(default = "default_coupling")]
    pub coupling: f64,

    /// Explicit transverse-field values; the default sweep when absent.
    #[serde(default)]
    pub fields: Option<Vec<f64>>,

    /// Name of the runtime program.
    #[serde(default = "default_program_id")]
    pub program_id: String,

    /// Access instance, `hub/group/project`.
    #[serde(default = "default_instance")]
    pub instance: Option<String>,

    /// Backend to use; the least busy match of the filter when absent.
    #[serde(default)]
    pub backend: Option<String>,

    /// Qubit count required of an automatically selected backend.
    #[serde(default = "default_backend_qubits")]
    pub backend_qubits: Option<usize>,

    /// Shots per circuit evaluation.
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Apply readout-error mitigation.
    #[serde(default = "default_true")]
    pub measurement_error_mitigation: bool,

    /// Starting point for the optimizer.
    #[serde(default)]
    pub initial_parameters: Option<Vec<f64>>,

    /// Ansatz layer layout.
    #[serde(default)]
    pub ansatz: Su2Layout,

    /// Optimizer settings.
    #[serde(default)]
    pub optimizer: Spsa,

    /// Record failed submissions and keep going instead of aborting.
    #[serde(default)]
    pub continue_on_error: bool,

    /// Build and record jobs without contacting the remote service.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_num_qubits() -> usize {
    4
}

fn default_h_bias() -> f64 {
    0.1
}

fn default_coupling() -> f64 {
    1.0
}

fn default_program_id() -> String {
    "vqe".to_string()
}

fn default_instance() -> Option<String> {
    Some("ibm-q/open/main".to_string())
}

fn default_backend_qubits() -> Option<usize> {
    Some(5)
}

fn default_shots() -> u32 {
    1024
}

fn default_true() -> bool {
    true
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            num_qubits: default_num_qubits(),
            h_bias: default_h_bias(),
            coupling: default_coupling(),
            fields: None,
            program_id: default_program_id(),
            instance: default_instance(),
            backend: None,
            backend_qubits: default_backend_qubits(),
            shots: default_shots(),
            measurement_error_mitigation: true,
            initial_parameters: None,
            ansatz: Su2Layout::default(),
            optimizer: Spsa::default(),
            continue_on_error: false,
            dry_run: false,
        }
    }
}

impl SweepConfig {
    /// `~/.tfim-sweep/config.yaml`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".tfim-sweep").join("config.yaml"))
    }

    /// Parse a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        let config = Self::from_yaml_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then `path` (or the default file if it exists), then the
    /// process environment.
    ///
    /// An explicit `path` that does not exist is an error; a missing default
    /// file is not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.is_file() => {
                    tracing::debug!(path = %p.display(), "loading default config file");
                    Self::from_file(p)?
                }
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `TFIM_*` variables looked up through `lookup`.
    ///
    /// Only variables that are set take effect. Values that fail to parse
    /// are reported rather than ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TFIM_NUM_QUBITS") {
            self.num_qubits = parse_env("TFIM_NUM_QUBITS", &v)?;
        }
        if let Some(v) = lookup("TFIM_H_BIAS") {
            self.h_bias = parse_env("TFIM_H_BIAS", &v)?;
        }
        if let Some(v) = lookup("TFIM_SHOTS") {
            self.shots = parse_env("TFIM_SHOTS", &v)?;
        }
        if let Some(v) = lookup("TFIM_BACKEND") {
            let v = v.trim();
            self.backend = (!v.is_empty()).then(|| v.to_string());
        }
        if let Some(v) = lookup("TFIM_INSTANCE") {
            let v = v.trim();
            self.instance = (!v.is_empty()).then(|| v.to_string());
        }
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_qubits < 2 {
            return Err(ConfigError::Validation(format!(
                "num_qubits must be at least 2, got {}",
                self.num_qubits
            )));
        }
        if self.shots == 0 {
            return Err(ConfigError::Validation(
                "shots must be greater than 0".to_string(),
            ));
        }
        if !self.h_bias.is_finite() {
            return Err(ConfigError::Validation(format!(
                "h_bias must be finite, got {}",
                self.h_bias
            )));
        }
        if !self.coupling.is_finite() {
            return Err(ConfigError::Validation(format!(
                "coupling must be finite, got {}",
                self.coupling
            )));
        }
        if self.program_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "program_id must not be empty".to_string(),
            ));
        }
        if self.ansatz.su2_gates.is_empty() {
            return Err(ConfigError::Validation(
                "ansatz.su2_gates must name at least one gate".to_string(),
            ));
        }
        if let Some(fields) = &self.fields {
            if fields.is_empty() {
                return Err(ConfigError::Validation(
                    "fields must not be empty; omit it to use the default sweep".to_string(),
                ));
            }
            if let Some(bad) = fields.iter().find(|h| !h.is_finite()) {
                return Err(ConfigError::Validation(format!(
                    "fields contains a non-finite value: {bad}"
                )));
            }
        }
        Ok(())
    }

    /// Selection filter for an automatically chosen backend.
    pub fn backend_filter(&self) -> BackendFilter {
        BackendFilter::default().with_qubits(self.backend_qubits)
    }

    /// The configured field list, or the default sweep.
    pub fn field_sweep(&self) -> Result<FieldSweep, ConfigError> {
        match &self.fields {
            Some(values) => FieldSweep::with_values(values.iter().copied())
                .map_err(|e| ConfigError::Validation(e.to_string())),
            None => Ok(FieldSweep::default_ising()),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::Parse(format!("{key}={value}: {e}")))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = SweepConfig::default();
        assert_eq!(config.num_qubits, 4);
        assert_eq!(config.h_bias, 0.1);
        assert_eq!(config.coupling, 1.0);
        assert_eq!(config.shots, 1024);
        assert!(config.measurement_error_mitigation);
        assert_eq!(config.program_id, "vqe");
        assert_eq!(config.instance.as_deref(), Some("ibm-q/open/main"));
        assert_eq!(config.backend_qubits, Some(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            SweepConfig::from_yaml_str("  \n").unwrap(),
            SweepConfig::default()
        );
    }

    #[test]
    fn test_partial_yaml() {
        let config = SweepConfig::from_yaml_str("h_bias: 0.25\nbackend: ibmq_quito\n").unwrap();
        assert_eq!(config.h_bias, 0.25);
        assert_eq!(config.backend.as_deref(), Some("ibmq_quito"));
        assert_eq!(config.shots, 1024);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = SweepConfig::from_yaml_str("shotz: 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SweepConfig::default();
        config
            .apply_env(env(&[
                ("TFIM_NUM_QUBITS", "6"),
                ("TFIM_H_BIAS", "0.0"),
                ("TFIM_SHOTS", " 4000 "),
                ("TFIM_BACKEND", "ibm_nairobi"),
                ("TFIM_INSTANCE", ""),
            ]))
            .unwrap();
        assert_eq!(config.num_qubits, 6);
        assert_eq!(config.h_bias, 0.0);
        assert_eq!(config.shots, 4000);
        assert_eq!(config.backend.as_deref(), Some("ibm_nairobi"));
        assert_eq!(config.instance, None);
    }

    #[test]
    fn test_env_parse_error() {
        let mut config = SweepConfig::default();
        let err = config
            .apply_env(env(&[("TFIM_SHOTS", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("TFIM_SHOTS"));
    }

    #[test]
    fn test_validate_rejects() {
        let cases: Vec<Box<dyn Fn(&mut SweepConfig)>> = vec![
            Box::new(|c| c.num_qubits = 1),
            Box::new(|c| c.shots = 0),
            Box::new(|c| c.h_bias = f64::NAN),
            Box::new(|c| c.coupling = f64::INFINITY),
            Box::new(|c| c.program_id = " ".into()),
            Box::new(|c| c.ansatz.su2_gates.clear()),
            Box::new(|c| c.fields = Some(vec![])),
            Box::new(|c| c.fields = Some(vec![1.0, f64::NAN])),
        ];
        for mutate in cases {
            let mut config = SweepConfig::default();
            mutate(&mut config);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_field_sweep_override() {
        let config = SweepConfig {
            fields: Some(vec![2.0, 0.5, 2.0]),
            ..SweepConfig::default()
        };
        assert_eq!(config.field_sweep().unwrap().values(), &[0.5, 2.0]);
        assert_eq!(SweepConfig::default().field_sweep().unwrap().len(), 11);
    }

    #[test]
    fn test_backend_filter_width() {
        let config = SweepConfig {
            backend_qubits: None,
            ..SweepConfig::default()
        };
        assert_eq!(config.backend_filter().num_qubits, None);
        assert_eq!(SweepConfig::default().backend_filter().num_qubits, Some(5));
    }
}
