// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! All configuration comes from the environment and is read once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `LEDGER_MSP_ID` | Member organization id of the signing identity | `Org1MSP` |
//! | `LEDGER_CERT_PATH` | PEM certificate of the signing identity | Required |
//! | `LEDGER_KEY_DIR` | Keystore directory; the first file (by name) is the PKCS#8 key | Required |
//! | `LEDGER_TLS_CA_PATH` | PEM trust anchor of the peer's TLS certificate | Required |
//! | `LEDGER_PEER_ENDPOINT` | `host:port` of the peer gateway | `localhost:7051` |
//! | `LEDGER_GATEWAY_PEER` | TLS server name of the peer (empty disables the override) | `peer0.org1.example.com` |
//! | `LEDGER_CHANNEL` | Channel name | `mychannel` |
//! | `LEDGER_CHAINCODE` | Chaincode name | `basic` |
//! | `LEDGER_EVALUATE_TIMEOUT_MS` | Evaluate budget | `5000` |
//! | `LEDGER_ENDORSE_TIMEOUT_MS` | Endorsement budget | `15000` |
//! | `LEDGER_SUBMIT_TIMEOUT_MS` | Ordering budget | `5000` |
//! | `LEDGER_COMMIT_TIMEOUT_MS` | Commit status budget | `60000` |
//! | `LEDGER_CONNECT_TIMEOUT_MS` | TCP/TLS connect budget | `5000` |
//! | `LEDGER_RECONNECT_ATTEMPTS` | Connection attempts per acquire | `4` |
//! | `LEDGER_CALL_TIMEOUT_MS` | Overall deadline per HTTP request (0 disables) | `0` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `9099` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use crate::ledger::{BackoffPolicy, GatewayConfig, IdentityConfig, PeerConfig, Timeouts};

pub const MSP_ID_ENV: &str = "LEDGER_MSP_ID";
pub const CERT_PATH_ENV: &str = "LEDGER_CERT_PATH";
pub const KEY_DIR_ENV: &str = "LEDGER_KEY_DIR";
pub const TLS_CA_PATH_ENV: &str = "LEDGER_TLS_CA_PATH";
pub const PEER_ENDPOINT_ENV: &str = "LEDGER_PEER_ENDPOINT";
pub const GATEWAY_PEER_ENV: &str = "LEDGER_GATEWAY_PEER";
pub const CHANNEL_ENV: &str = "LEDGER_CHANNEL";
pub const CHAINCODE_ENV: &str = "LEDGER_CHAINCODE";
pub const EVALUATE_TIMEOUT_ENV: &str = "LEDGER_EVALUATE_TIMEOUT_MS";
pub const ENDORSE_TIMEOUT_ENV: &str = "LEDGER_ENDORSE_TIMEOUT_MS";
pub const SUBMIT_TIMEOUT_ENV: &str = "LEDGER_SUBMIT_TIMEOUT_MS";
pub const COMMIT_TIMEOUT_ENV: &str = "LEDGER_COMMIT_TIMEOUT_MS";
pub const CONNECT_TIMEOUT_ENV: &str = "LEDGER_CONNECT_TIMEOUT_MS";
pub const RECONNECT_ATTEMPTS_ENV: &str = "LEDGER_RECONNECT_ATTEMPTS";
pub const CALL_TIMEOUT_ENV: &str = "LEDGER_CALL_TIMEOUT_MS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable selecting `json` or `pretty` log output.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_MSP_ID: &str = "Org1MSP";
pub const DEFAULT_PEER_ENDPOINT: &str = "localhost:7051";
pub const DEFAULT_GATEWAY_PEER: &str = "peer0.org1.example.com";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9099;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub identity: IdentityConfig,
    pub peer: PeerConfig,
    pub gateway: GatewayConfig,
    pub backoff: BackoffPolicy,
    /// Deadline applied to every HTTP-originated call.
    pub call_timeout: Option<Duration>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let defaults = Timeouts::default();
        let gateway_defaults = GatewayConfig::default();

        let identity = IdentityConfig {
            msp_id: env.or_default(MSP_ID_ENV, DEFAULT_MSP_ID),
            cert_path: PathBuf::from(env.required(CERT_PATH_ENV)?),
            key_dir: PathBuf::from(env.required(KEY_DIR_ENV)?),
            tls_ca_path: PathBuf::from(env.required(TLS_CA_PATH_ENV)?),
        };

        let server_name = match env.raw(GATEWAY_PEER_ENV) {
            Some(value) if value.is_empty() => None,
            Some(value) => Some(value),
            None => Some(DEFAULT_GATEWAY_PEER.to_string()),
        };
        let peer = PeerConfig {
            endpoint: env.or_default(PEER_ENDPOINT_ENV, DEFAULT_PEER_ENDPOINT),
            server_name,
            connect_timeout: env.millis(CONNECT_TIMEOUT_ENV, DEFAULT_CONNECT_TIMEOUT)?,
        };

        let gateway = GatewayConfig {
            channel: env.or_default(CHANNEL_ENV, &gateway_defaults.channel),
            chaincode: env.or_default(CHAINCODE_ENV, &gateway_defaults.chaincode),
            timeouts: Timeouts {
                evaluate: env.millis(EVALUATE_TIMEOUT_ENV, defaults.evaluate)?,
                endorse: env.millis(ENDORSE_TIMEOUT_ENV, defaults.endorse)?,
                submit: env.millis(SUBMIT_TIMEOUT_ENV, defaults.submit)?,
                commit: env.millis(COMMIT_TIMEOUT_ENV, defaults.commit)?,
            },
        };

        let backoff = BackoffPolicy {
            max_attempts: env.parsed(RECONNECT_ATTEMPTS_ENV, BackoffPolicy::default().max_attempts)?,
            ..BackoffPolicy::default()
        };
        if backoff.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: RECONNECT_ATTEMPTS_ENV,
                value: "0".to_string(),
            });
        }

        let call_timeout = Some(env.millis(CALL_TIMEOUT_ENV, Duration::ZERO)?)
            .filter(|timeout| !timeout.is_zero());

        Ok(Self {
            identity,
            peer,
            gateway,
            backoff,
            call_timeout,
            host: env.or_default(HOST_ENV, DEFAULT_HOST),
            port: env.parsed(PORT_ENV, DEFAULT_PORT)?,
        })
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Trimmed value; present-but-blank is reported as `Some("")`.
    fn raw(&self, name: &str) -> Option<String> {
        (self.0)(name).map(|v| v.trim().to_string())
    }

    fn optional(&self, name: &str) -> Option<String> {
        self.raw(name).filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: std::str::FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.optional(name) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value }),
            None => Ok(default),
        }
    }

    fn millis(&self, name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        match self.optional(name) {
            Some(_) => Ok(Duration::from_millis(self.parsed(name, 0u64)?)),
            None => Ok(default),
        }
    }
}
