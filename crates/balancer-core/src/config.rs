//! balancer.toml configuration parser.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default HTTP port of the service.
pub const DEFAULT_HTTP_PORT: u16 = 8081;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub log: LogConfig,
    pub tracing: TracingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::from([0, 0, 0, 0]),
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Seconds between metrics summaries in the log.
    pub summary_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            summary_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info,balancerd=debug,balancer_api=debug".to_string(),
            json: false,
        }
    }
}

/// OTLP span export. Only honoured by builds with the `telemetry` feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    pub enabled: bool,
    pub service_name: String,
    pub service_version: String,
    /// Reported as `deployment.environment`.
    pub environment: String,
    /// OTLP/HTTP collector, e.g. `http://localhost:4318`.
    pub endpoint: String,
    /// Fraction of traces sampled, `0.0..=1.0`.
    pub sampling_ratio: f64,
    pub batch_timeout_secs: u64,
    pub max_export_batch_size: usize,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: "ingredients-balancer".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            endpoint: "http://localhost:4318".to_string(),
            sampling_ratio: 1.0,
            batch_timeout_secs: 5,
            max_export_batch_size: 512,
        }
    }
}

impl TracingConfig {
    /// Full traces URL: scheme defaulted to `http://`, `/v1/traces` appended.
    pub fn traces_url(&self) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        let base = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("http://{endpoint}")
        };
        if base.ends_with("/v1/traces") {
            base
        } else {
            format!("{base}/v1/traces")
        }
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.sampling_ratio) {
            return Err(ConfigError::InvalidValue {
                key: "tracing.sampling_ratio",
                value: self.sampling_ratio.to_string(),
            });
        }
        Ok(())
    }
}

impl ServiceConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.tracing.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply environment overrides. Empty values are ignored.
    ///
    /// - `HTTP_PORT` replaces `server.http_port`
    /// - `OTEL_SERVICE_NAME`, `OTEL_SERVICE_VERSION`, `ENVIRONMENT` set the
    ///   tracing resource
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT` sets the collector and enables export
    /// - `OTEL_TRACES_SAMPLER_ARG` sets the sampling ratio
    /// - `OTEL_SDK_DISABLED=true` disables export, whatever else is set
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(port) = var("HTTP_PORT") {
            self.server.http_port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "HTTP_PORT",
                value: port.clone(),
            })?;
        }

        let tracing = &mut self.tracing;
        if let Some(name) = var("OTEL_SERVICE_NAME") {
            tracing.service_name = name;
        }
        if let Some(version) = var("OTEL_SERVICE_VERSION") {
            tracing.service_version = version;
        }
        if let Some(environment) = var("ENVIRONMENT") {
            tracing.environment = environment;
        }
        if let Some(endpoint) = var("OTEL_EXPORTER_OTLP_ENDPOINT") {
            tracing.endpoint = endpoint;
            tracing.enabled = true;
        }
        if let Some(ratio) = var("OTEL_TRACES_SAMPLER_ARG") {
            tracing.sampling_ratio = ratio.parse().map_err(|_| ConfigError::InvalidValue {
                key: "OTEL_TRACES_SAMPLER_ARG",
                value: ratio.clone(),
            })?;
        }
        if var("OTEL_SDK_DISABLED").is_some_and(|v| v.eq_ignore_ascii_case("true")) {
            tracing.enabled = false;
        }
        tracing.validate()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.bind, self.server.http_port)
    }

    pub fn summary_interval(&self) -> Duration {
        Duration::from_secs(self.metrics.summary_interval_secs.max(1))
    }
}
