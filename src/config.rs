use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_region")]
    pub region: String,

    pub profile: Option<String>,

    #[serde(default = "default_template")]
    pub template: PathBuf,

    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_request_delay")]
    pub request_delay_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            region: default_region(),
            profile: None,
            template: default_template(),
            output: default_output(),
            max_tokens: default_max_tokens(),
            request_delay_secs: default_request_delay(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = PathBuf::from(".clj-refactor.yml");
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        let alt_config_path = PathBuf::from(".clj-refactor.yaml");
        if alt_config_path.exists() {
            let content = std::fs::read_to_string(&alt_config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".clj-refactor.yml");
            if home_config.exists() {
                let content = std::fs::read_to_string(&home_config)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    pub fn merge_with_cli(
        &mut self,
        model: Option<String>,
        region: Option<String>,
        profile: Option<String>,
        template: Option<PathBuf>,
        output: Option<PathBuf>,
        max_tokens: Option<usize>,
    ) {
        if let Some(model) = model {
            self.model = model;
        }
        if let Some(region) = region {
            self.region = region;
        }
        if let Some(profile) = profile {
            self.profile = Some(profile);
        }
        if let Some(template) = template {
            self.template = template;
        }
        if let Some(output) = output {
            self.output = output;
        }
        if let Some(max_tokens) = max_tokens {
            self.max_tokens = max_tokens;
        }
    }
}

fn default_model() -> String {
    "anthropic.claude-opus-4-5-20251101-v1:0".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_template() -> PathBuf {
    PathBuf::from("prompts/refactor-clojure-file.md")
}

fn default_output() -> PathBuf {
    PathBuf::from("refactored")
}

fn default_max_tokens() -> usize {
    16384
}

// 10 requests per minute.
fn default_request_delay() -> f64 {
    6.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_remaining_defaults() {
        let config: Config =
            serde_yaml::from_str("model: anthropic.claude-sonnet-4-5-20250929-v1:0\n").unwrap();
        assert_eq!(config.model, "anthropic.claude-sonnet-4-5-20250929-v1:0");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.max_tokens, 16384);
        assert_eq!(config.output, PathBuf::from("refactored"));
        assert!((config.request_delay_secs - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cli_values_override_file_values() {
        let mut config = Config::default();
        config.merge_with_cli(
            Some("custom-model".to_string()),
            Some("eu-west-1".to_string()),
            Some("work".to_string()),
            None,
            Some(PathBuf::from("out")),
            Some(4096),
        );

        assert_eq!(config.model, "custom-model");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.profile.as_deref(), Some("work"));
        assert_eq!(config.template, default_template());
        assert_eq!(config.output, PathBuf::from("out"));
        assert_eq!(config.max_tokens, 4096);
    }
}
