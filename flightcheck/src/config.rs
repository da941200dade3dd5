use eu261::config::Config as Eu261Config;
use serde::Deserialize;
use std::fs::File;

#[derive(Deserialize, Debug)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

fn default_log_filter() -> String {
    "info".into()
}

#[derive(Deserialize, Debug)]
pub struct LoggingConfig {
    #[serde(default)]
    pub sentry_dsn: Option<String>,
    /// `EnvFilter` directives, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            sentry_dsn: None,
            filter: default_log_filter(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(default)]
    pub eu261: Eu261Config,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use eu261::config::ReferenceDataStoreType;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            logging:
                sentry_dsn: https://key@sentry.example.com/1
                filter: eu261=debug,info
            eu261:
                reference_data_store:
                    type: filesystem
                    base_dir: /var/lib/flightcheck/
                    filename: eu_airports.json
                eligible_flights:
                    lookback_hours: 48
                    max_results: 10
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        let metrics = config.common.metrics.expect("metrics config");
        assert_eq!(metrics.statsd_host, "127.0.0.1");
        assert_eq!(metrics.statsd_port, 8125);
        assert_eq!(
            config.common.logging.sentry_dsn.as_deref(),
            Some("https://key@sentry.example.com/1")
        );
        assert_eq!(config.common.logging.filter, "eu261=debug,info");
        assert_eq!(
            config.eu261.reference_data_store.r#type,
            ReferenceDataStoreType::Filesystem {
                base_dir: "/var/lib/flightcheck/".into(),
                filename: "eu_airports.json".into(),
            }
        );
        assert_eq!(config.eu261.eligible_flights.lookback_hours, 48);
        assert_eq!(config.eu261.eligible_flights.max_results, 10);
        assert_eq!(config.eu261.eligible_flights.airline_filter, None);
    }

    #[test]
    fn minimal_config() {
        let tmp = write_tmp_file("eu261:\n  reference_data_store:\n    type: builtin\n");
        let config = Config::from_file(tmp.path()).expect("load config");

        assert!(config.common.metrics.is_none());
        assert!(config.common.logging.sentry_dsn.is_none());
        assert_eq!(config.common.logging.filter, "info");
        assert_eq!(
            config.eu261.reference_data_store.r#type,
            ReferenceDataStoreType::Builtin
        );
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(&dir.path().join("missing.yaml"));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn invalid_yaml() {
        let tmp = write_tmp_file("metrics:\n  statsd_port: not-a-port\n");
        let result = Config::from_file(tmp.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
