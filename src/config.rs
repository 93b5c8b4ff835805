use std::{env, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Atomic,
    Incremental,
}

impl FetchMode {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(Self::Atomic),
            "incremental" | "stream" | "streaming" => Ok(Self::Incremental),
            other => Err(ConfigError::invalid("FETCH_MODE", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub base_url: String,
    pub fetch_path: String,
    pub mode: FetchMode,
    pub default_chart_type: String,
    pub remote_visualize: bool,
    pub timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            fetch_path: "/analyze".to_string(),
            mode: FetchMode::Atomic,
            default_chart_type: "line".to_string(),
            remote_visualize: false,
            timeout: None,
        }
    }
}

impl PipelineConfig {
    pub fn fetch_url(&self) -> String {
        join_url(&self.base_url, &self.fetch_path)
    }

    pub fn visualize_url(&self) -> String {
        join_url(&self.base_url, "/mcp/visualize")
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

impl ConfigError {
    fn invalid(var: &'static str, value: impl Into<String>) -> Self {
        Self {
            var,
            value: value.into(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = PipelineConfig::default();

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::invalid("PORT", value))?,
            None => 8080,
        };

        let mode = match lookup("FETCH_MODE") {
            Some(value) => FetchMode::parse(&value)?,
            None => defaults.mode,
        };

        let remote_visualize = match lookup("REMOTE_VISUALIZE") {
            Some(value) => parse_bool("REMOTE_VISUALIZE", &value)?,
            None => defaults.remote_visualize,
        };

        let timeout = match lookup("ANALYSIS_TIMEOUT_SECS") {
            Some(value) => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::invalid("ANALYSIS_TIMEOUT_SECS", value))?;
                Some(Duration::from_secs(secs))
            }
            None => defaults.timeout,
        };

        Ok(Self {
            port,
            pipeline: PipelineConfig {
                base_url: lookup("ANALYSIS_BASE_URL").unwrap_or(defaults.base_url),
                fetch_path: lookup("ANALYSIS_PATH").unwrap_or(defaults.fetch_path),
                mode,
                default_chart_type: lookup("DEFAULT_CHART_TYPE")
                    .unwrap_or(defaults.default_chart_type),
                remote_visualize,
                timeout,
            },
        })
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::invalid(var, value)),
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.pipeline.mode, FetchMode::Atomic);
        assert_eq!(settings.pipeline.default_chart_type, "line");
        assert_eq!(settings.pipeline.fetch_url(), "http://127.0.0.1:5000/analyze");
        assert!(settings.pipeline.timeout.is_none());
        assert!(!settings.pipeline.remote_visualize);
    }

    #[test]
    fn reads_incremental_mcp_variant() {
        let settings = settings(&[
            ("PORT", "9001"),
            ("ANALYSIS_BASE_URL", "http://backend:8000/"),
            ("ANALYSIS_PATH", "mcp/fetch"),
            ("FETCH_MODE", "Incremental"),
            ("DEFAULT_CHART_TYPE", "bar"),
            ("REMOTE_VISUALIZE", "yes"),
            ("ANALYSIS_TIMEOUT_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(settings.port, 9001);
        assert_eq!(settings.pipeline.mode, FetchMode::Incremental);
        assert_eq!(settings.pipeline.fetch_url(), "http://backend:8000/mcp/fetch");
        assert_eq!(
            settings.pipeline.visualize_url(),
            "http://backend:8000/mcp/visualize"
        );
        assert_eq!(settings.pipeline.default_chart_type, "bar");
        assert!(settings.pipeline.remote_visualize);
        assert_eq!(settings.pipeline.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_unknown_mode_and_bad_port() {
        let err = settings(&[("FETCH_MODE", "sideways")]).unwrap_err();
        assert_eq!(err.var, "FETCH_MODE");
        let err = settings(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.var, "PORT");
    }
}
