use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::env;

/// Default WebHDFS REST root on a namenode
pub const DEFAULT_WEBHDFS_URL: &str = "http://localhost:9870/webhdfs/v1";

pub const DEFAULT_WEBHDFS_USER: &str = "hdfs";

pub const DEFAULT_HDFS_CLI: &str = "hdfs";

pub const DEFAULT_HDFS_CLI_ARGS: &str = "dfs";

/// How bytes reach the distributed filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeTransport {
    /// HTTP gateway speaking the WebHDFS REST protocol
    #[default]
    WebHdfs,
    /// Shell out to a local filesystem client such as `hdfs dfs`
    Cli,
}

impl std::str::FromStr for BridgeTransport {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "webhdfs" | "http" => Ok(BridgeTransport::WebHdfs),
            "cli" | "shell" => Ok(BridgeTransport::Cli),
            other => Err(anyhow::anyhow!("Invalid bridge transport: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub transport: BridgeTransport,
    pub webhdfs_url: String,
    pub webhdfs_user: String,
    pub cli_program: String,
    pub cli_args: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            transport: BridgeTransport::default(),
            webhdfs_url: DEFAULT_WEBHDFS_URL.to_string(),
            webhdfs_user: DEFAULT_WEBHDFS_USER.to_string(),
            cli_program: DEFAULT_HDFS_CLI.to_string(),
            cli_args: split_args(DEFAULT_HDFS_CLI_ARGS),
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let transport = match env::var("BRIDGE_TRANSPORT") {
            Ok(value) => value.parse()?,
            Err(_) => BridgeTransport::default(),
        };

        Ok(Self {
            transport,
            webhdfs_url: env::var("WEBHDFS_URL")
                .unwrap_or_else(|_| DEFAULT_WEBHDFS_URL.to_string()),
            webhdfs_user: env::var("WEBHDFS_USER")
                .unwrap_or_else(|_| DEFAULT_WEBHDFS_USER.to_string()),
            cli_program: env::var("HDFS_CLI").unwrap_or_else(|_| DEFAULT_HDFS_CLI.to_string()),
            cli_args: split_args(
                &env::var("HDFS_CLI_ARGS").unwrap_or_else(|_| DEFAULT_HDFS_CLI_ARGS.to_string()),
            ),
        })
    }

    /// Gateway pointing at `url`, e.g. a mock server in tests
    pub fn for_webhdfs(url: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            transport: BridgeTransport::WebHdfs,
            webhdfs_url: url.into(),
            webhdfs_user: user.into(),
            ..Self::default()
        }
    }

    pub fn for_cli(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            transport: BridgeTransport::Cli,
            cli_program: program.into(),
            cli_args: args,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        match self.transport {
            BridgeTransport::WebHdfs => {
                if !(self.webhdfs_url.starts_with("http://")
                    || self.webhdfs_url.starts_with("https://"))
                {
                    bail!("WEBHDFS_URL must start with http:// or https://");
                }
                if self.webhdfs_user.trim().is_empty() {
                    bail!("WEBHDFS_USER cannot be empty");
                }
            },
            BridgeTransport::Cli => {
                if self.cli_program.trim().is_empty() {
                    bail!("HDFS_CLI cannot be empty");
                }
            },
        }
        Ok(())
    }
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.transport, BridgeTransport::WebHdfs);
        assert_eq!(config.cli_args, vec!["dfs".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = BridgeConfig::for_webhdfs("namenode:9870", "hdfs");
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_cli() {
        env::set_var("BRIDGE_TRANSPORT", "cli");
        env::set_var("HDFS_CLI", "/opt/hadoop/bin/hadoop");
        env::set_var("HDFS_CLI_ARGS", "fs -D dfs.replication=1");

        let config = BridgeConfig::from_env().unwrap();
        assert_eq!(config.transport, BridgeTransport::Cli);
        assert_eq!(config.cli_program, "/opt/hadoop/bin/hadoop");
        assert_eq!(config.cli_args, vec!["fs", "-D", "dfs.replication=1"]);

        env::remove_var("BRIDGE_TRANSPORT");
        env::remove_var("HDFS_CLI");
        env::remove_var("HDFS_CLI_ARGS");
    }
}
