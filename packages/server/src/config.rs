//! Process configuration.
//!
//! Everything the handlers need from the environment is read once at
//! startup into a [`Config`] and passed through router state.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use pora_volume::{JsonResolver, MountResolver, PatternResolver};

/// How the mount directory is pulled out of the service-binding blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResolverKind {
    /// Textual `"container_dir": "<dir>"` match.
    #[default]
    Pattern,
    /// Structured JSON lookup.
    Json,
}

impl ResolverKind {
    pub fn build(self) -> Arc<dyn MountResolver> {
        match self {
            ResolverKind::Pattern => Arc::new(PatternResolver),
            ResolverKind::Json => Arc::new(JsonResolver),
        }
    }
}

/// pora - persistent volume probe server
#[derive(Parser, Debug)]
#[command(name = "pora")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Identity reported by `/` and appended to read responses
    #[arg(long, env = "INSTANCE_INDEX", default_value = "")]
    pub instance_index: String,

    /// Space-separated list of ports to listen on
    #[arg(long = "port", env = "PORT", default_value = "8080")]
    pub ports: String,

    /// Service-binding JSON describing the attached volume
    #[arg(long, env = "VCAP_SERVICES", default_value = "", hide_env_values = true)]
    pub vcap_services: String,

    /// Mount directory lookup strategy
    #[arg(
        long,
        env = "PORA_MOUNT_RESOLVER",
        value_enum,
        default_value_t = ResolverKind::Pattern
    )]
    pub mount_resolver: ResolverKind,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no ports configured")]
    NoPorts,

    #[error("invalid port: {0:?}")]
    InvalidPort(String),
}

/// Startup configuration shared by every listener.
#[derive(Debug, Clone)]
pub struct Config {
    pub instance_index: String,
    pub ports: Vec<u16>,
    pub service_binding: String,
    pub mount_resolver: ResolverKind,
}

/// Split a space-separated port list.
pub fn parse_ports(ports: &str) -> Result<Vec<u16>, ConfigError> {
    let ports = ports
        .split_whitespace()
        .map(|p| p.parse().map_err(|_| ConfigError::InvalidPort(p.to_string())))
        .collect::<Result<Vec<u16>, _>>()?;
    if ports.is_empty() {
        return Err(ConfigError::NoPorts);
    }
    Ok(ports)
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        Ok(Self {
            instance_index: args.instance_index,
            ports: parse_ports(&args.ports)?,
            service_binding: args.vcap_services,
            mount_resolver: args.mount_resolver,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_split_on_spaces() {
        assert_eq!(parse_ports("8080 8081  9000").unwrap(), vec![8080, 8081, 9000]);
        assert_eq!(parse_ports("8080").unwrap(), vec![8080]);
    }

    #[test]
    fn ports_empty() {
        assert_eq!(parse_ports(""), Err(ConfigError::NoPorts));
        assert_eq!(parse_ports("   "), Err(ConfigError::NoPorts));
    }

    #[test]
    fn ports_invalid() {
        assert_eq!(
            parse_ports("8080 http"),
            Err(ConfigError::InvalidPort("http".to_string()))
        );
        assert_eq!(
            parse_ports("70000"),
            Err(ConfigError::InvalidPort("70000".to_string()))
        );
    }

    #[test]
    fn args_from_flags() {
        let args = Args::try_parse_from([
            "pora",
            "--instance-index",
            "2",
            "--port",
            "8080 8081",
            "--vcap-services",
            r#"{"container_dir": "/mnt"}"#,
            "--mount-resolver",
            "json",
        ])
        .unwrap();
        let config = Config::try_from(args).unwrap();

        assert_eq!(config.instance_index, "2");
        assert_eq!(config.ports, vec![8080, 8081]);
        assert_eq!(config.service_binding, r#"{"container_dir": "/mnt"}"#);
        assert_eq!(config.mount_resolver, ResolverKind::Json);
    }

    #[test]
    fn resolver_kinds_build() {
        let blob = r#"{"container_dir": "/mnt/a"}"#;
        assert_eq!(
            ResolverKind::Pattern.build().resolve(blob).unwrap(),
            std::path::PathBuf::from("/mnt/a")
        );
        assert_eq!(
            ResolverKind::Json.build().resolve(blob).unwrap(),
            std::path::PathBuf::from("/mnt/a")
        );
    }
}
