//! # Parser Configuration Module
//!
//! Configuration for a parser run: where the class descriptors live, which
//! annotations mark endpoints, which plugins run and how they are tuned.
//!
//! ## File Formats
//!
//! [`ParserConfig::load`] reads YAML (`.yaml`/`.yml`), JSON (`.json`) or
//! TOML (`.toml`), picked by extension:
//!
//! ```yaml
//! classPath:
//!   - build/classes
//! endpointAnnotation: com.example.Endpoint
//! endpointExposedAnnotation: com.example.EndpointExposed
//! endpointPrefix: connect
//! nonnullAnnotations: [Nonnull, NonNull]
//! transferTypes:
//!   com.example.Money: java.math.BigDecimal
//! plugins:
//!   disable: [validation-constraints]
//!   use:
//!     - name: custom-plugin
//!       order: 200
//! ```
//!
//! Relative class-path entries are resolved against the directory holding
//! the configuration file.
//!
//! ## Environment Variables
//!
//! ### `ENDPOINTGEN_CLASS_PATH`
//!
//! Replaces the class path with a platform path list
//! (`dir1:dir2` on Unix, `dir1;dir2` on Windows).
//!
//! ### `ENDPOINTGEN_ENDPOINT_PREFIX`
//!
//! Overrides the URL prefix endpoints are served under.
//!
//! ## Validation
//!
//! Validation is fail-fast: [`ParserConfig::validate`] runs before any
//! descriptor is read and reports the first problem as
//! [`ParserError::Config`].

use crate::parser::ParserError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

pub const CLASS_PATH_ENV: &str = "ENDPOINTGEN_CLASS_PATH";
pub const ENDPOINT_PREFIX_ENV: &str = "ENDPOINTGEN_ENDPOINT_PREFIX";

fn default_prefix() -> String {
    "connect".to_string()
}

/// Settings for one parser run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserConfig {
    /// Directories or files holding class descriptors
    #[serde(default)]
    pub class_path: Vec<PathBuf>,
    /// Annotation marking endpoint classes (qualified or simple name)
    #[serde(default)]
    pub endpoint_annotation: String,
    /// Annotation marking superclasses whose methods are exposed
    #[serde(default)]
    pub endpoint_exposed_annotation: String,
    /// Base document merged under the generated paths and schemas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi_base: Option<PathBuf>,
    /// URL prefix endpoints are served under
    #[serde(default = "default_prefix")]
    pub endpoint_prefix: String,
    /// Document title and version
    #[serde(default)]
    pub application: ApplicationInfo,
    /// Annotation names that mark a value as never null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonnull_annotations: Option<Vec<String>>,
    /// Extra class mappings applied to signatures (`from -> to`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transfer_types: BTreeMap<String, String>,
    #[serde(default)]
    pub plugins: PluginsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInfo {
    pub title: String,
    pub version: String,
}

impl Default for ApplicationInfo {
    fn default() -> Self {
        Self {
            title: "Endpoints".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

/// Plugin selection.
///
/// Built-in plugins are enabled unless listed in `disable` or
/// `disableAllDefaults` is set; `use` entries add registered plugins or
/// override the order and configuration of enabled ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginsConfig {
    #[serde(default, rename = "use", skip_serializing_if = "Vec::is_empty")]
    pub use_plugins: Vec<PluginUse>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disable: Vec<String>,
    #[serde(default)]
    pub disable_all_defaults: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginUse {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value>,
}

impl ParserConfig {
    pub fn new(
        endpoint_annotation: impl Into<String>,
        endpoint_exposed_annotation: impl Into<String>,
    ) -> Self {
        Self {
            class_path: Vec::new(),
            endpoint_annotation: endpoint_annotation.into(),
            endpoint_exposed_annotation: endpoint_exposed_annotation.into(),
            openapi_base: None,
            endpoint_prefix: default_prefix(),
            application: ApplicationInfo::default(),
            nonnull_annotations: None,
            transfer_types: BTreeMap::new(),
            plugins: PluginsConfig::default(),
        }
    }

    pub fn with_class_path(mut self, entry: impl Into<PathBuf>) -> Self {
        self.class_path.push(entry.into());
        self
    }

    pub fn with_plugins(mut self, plugins: PluginsConfig) -> Self {
        self.plugins = plugins;
        self
    }

    /// Load a configuration file and apply environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut config: ParserConfig = match extension.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)
                .with_context(|| format!("invalid YAML in {}", path.display()))?,
            "json" => serde_json::from_str(&text)
                .with_context(|| format!("invalid JSON in {}", path.display()))?,
            "toml" => toml::from_str(&text)
                .with_context(|| format!("invalid TOML in {}", path.display()))?,
            other => anyhow::bail!(
                "unsupported configuration format `{other}` for {}",
                path.display()
            ),
        };

        if let Some(base_dir) = path.parent() {
            config.resolve_relative_to(base_dir);
        }
        config.apply_env_overrides();
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base_dir: &Path) {
        for entry in &mut self.class_path {
            if entry.is_relative() {
                *entry = base_dir.join(&*entry);
            }
        }
        if let Some(base) = &mut self.openapi_base {
            if base.is_relative() {
                *base = base_dir.join(&*base);
            }
        }
    }

    /// Apply `ENDPOINTGEN_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        if let Some(paths) = env::var_os(CLASS_PATH_ENV) {
            let entries: Vec<PathBuf> = env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !entries.is_empty() {
                self.class_path = entries;
            }
        }
        if let Ok(prefix) = env::var(ENDPOINT_PREFIX_ENV) {
            if !prefix.trim().is_empty() {
                self.endpoint_prefix = prefix;
            }
        }
    }

    /// Checks everything that does not need the file system.
    pub fn validate(&self) -> Result<(), ParserError> {
        if self.endpoint_annotation.trim().is_empty() {
            return Err(ParserError::Config(
                "endpoint annotation name is missing".to_string(),
            ));
        }
        if self.endpoint_exposed_annotation.trim().is_empty() {
            return Err(ParserError::Config(
                "endpoint-exposed annotation name is missing".to_string(),
            ));
        }
        let prefix = self.endpoint_prefix.trim_matches('/');
        if prefix.is_empty() || prefix.contains('/') {
            return Err(ParserError::Config(format!(
                "endpoint prefix `{}` must be a single path segment",
                self.endpoint_prefix
            )));
        }
        for name in self.plugins.disable.iter().chain(
            self.plugins.use_plugins.iter().map(|p| &p.name),
        ) {
            if name.trim().is_empty() {
                return Err(ParserError::Config("empty plugin name".to_string()));
            }
        }
        Ok(())
    }

    /// Checks that the class path is set and every entry exists.
    pub fn validate_class_path(&self) -> Result<(), ParserError> {
        if self.class_path.is_empty() {
            return Err(ParserError::Config("class path is empty".to_string()));
        }
        for entry in &self.class_path {
            if !entry.exists() {
                return Err(ParserError::Config(format!(
                    "class path entry {} does not exist",
                    entry.display()
                )));
            }
        }
        Ok(())
    }

    /// The endpoint prefix without surrounding slashes.
    pub fn prefix(&self) -> &str {
        self.endpoint_prefix.trim_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(suffix).expect("create temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file.flush().expect("flush");
        file
    }

    #[test]
    fn test_load_yaml_resolves_relative_class_path() {
        let file = write_config(
            ".yaml",
            r#"
classPath: [classes]
endpointAnnotation: Endpoint
endpointExposedAnnotation: EndpointExposed
plugins:
  disable: [validation-constraints]
  use:
    - name: nonnull
      configuration: { annotations: [Nonnull] }
"#,
        );
        let config = ParserConfig::load(file.path()).unwrap();
        let dir = file.path().parent().unwrap();
        assert_eq!(config.class_path, vec![dir.join("classes")]);
        assert_eq!(config.endpoint_prefix, "connect");
        assert_eq!(config.plugins.disable, vec!["validation-constraints"]);
        assert_eq!(config.plugins.use_plugins[0].name, "nonnull");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_toml_and_json() {
        let toml = write_config(
            ".toml",
            r#"
endpointAnnotation = "Endpoint"
endpointExposedAnnotation = "EndpointExposed"
[transferTypes]
"com.example.Money" = "java.math.BigDecimal"
"#,
        );
        let config = ParserConfig::load(toml.path()).unwrap();
        assert_eq!(
            config.transfer_types.get("com.example.Money").map(String::as_str),
            Some("java.math.BigDecimal")
        );

        let json = write_config(
            ".json",
            r#"{"endpointAnnotation": "Endpoint", "endpointExposedAnnotation": "X", "endpointPrefix": "rpc"}"#,
        );
        let config = ParserConfig::load(json.path()).unwrap();
        assert_eq!(config.prefix(), "rpc");
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let file = write_config(".ini", "x=1");
        assert!(ParserConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_validation_is_fail_fast() {
        let missing = ParserConfig::new("", "EndpointExposed");
        assert!(matches!(missing.validate(), Err(ParserError::Config(_))));

        let no_class_path = ParserConfig::new("Endpoint", "EndpointExposed");
        assert!(no_class_path.validate().is_ok());
        assert!(matches!(
            no_class_path.validate_class_path(),
            Err(ParserError::Config(_))
        ));

        let absent = ParserConfig::new("Endpoint", "EndpointExposed")
            .with_class_path("/definitely/not/here");
        assert!(absent.validate_class_path().is_err());

        let mut nested_prefix = ParserConfig::new("Endpoint", "EndpointExposed");
        nested_prefix.endpoint_prefix = "a/b".into();
        assert!(nested_prefix.validate().is_err());
    }
}
