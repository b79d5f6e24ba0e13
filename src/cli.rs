use std::path::PathBuf;

use clap::Parser;

use crate::config::{ServerConfig, DEFAULT_PORT};

/// Kubernetes webhook to call update-ca-certs on every pod creation
#[derive(Parser, Debug)]
#[command(
    name = "cacerts-webhook",
    version,
    long_about = "Kubernetes webhook to call update-ca-certs on every pod creation.\n\n\
                  Example:\n$ cacerts-webhook --tls-cert <tls_cert> --tls-key <tls_key> --port <port>"
)]
pub struct Cli {
    /// Certificate for TLS
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Private key file for TLS
    #[arg(long)]
    pub tls_key: Option<PathBuf>,

    /// Port to listen on for HTTPS traffic
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Cli {
    /// `None` unless both TLS paths were given.
    pub fn server_config(&self) -> Option<ServerConfig> {
        Some(ServerConfig {
            tls_cert: self.tls_cert.clone()?,
            tls_key: self.tls_key.clone()?,
            port: self.port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "cacerts-webhook",
            "--tls-cert",
            "/etc/webhook/tls.crt",
            "--tls-key",
            "/etc/webhook/tls.key",
            "--port",
            "8443",
        ])
        .unwrap();

        assert_eq!(
            cli.server_config(),
            Some(ServerConfig {
                tls_cert: PathBuf::from("/etc/webhook/tls.crt"),
                tls_key: PathBuf::from("/etc/webhook/tls.key"),
                port: 8443,
            })
        );
    }

    #[test]
    fn port_defaults_to_443() {
        let cli = Cli::try_parse_from([
            "cacerts-webhook",
            "--tls-cert",
            "tls.crt",
            "--tls-key",
            "tls.key",
        ])
        .unwrap();
        assert_eq!(cli.port, 443);
    }

    #[test]
    fn missing_tls_flags_yield_no_config() {
        let cli = Cli::try_parse_from(["cacerts-webhook", "--tls-cert", "tls.crt"]).unwrap();
        assert!(cli.server_config().is_none());

        let cli = Cli::try_parse_from(["cacerts-webhook"]).unwrap();
        assert!(cli.server_config().is_none());
    }

    #[test]
    fn rejects_unknown_flags_and_bad_ports() {
        assert!(Cli::try_parse_from(["cacerts-webhook", "--config", "x"]).is_err());
        assert!(Cli::try_parse_from(["cacerts-webhook", "--port", "70000"]).is_err());
    }
}
