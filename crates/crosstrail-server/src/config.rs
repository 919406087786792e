use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Context;
use crosstrail_core::DEFAULT_PORT;

/// Coordinator settings read from the environment at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads `PORT` and `CROSSTRAIL_HOST`, falling back to defaults when unset.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        if let Some(port) = lookup("PORT").filter(|v| !v.trim().is_empty()) {
            cfg.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be an integer in 0..=65535, got {port:?}"))?;
        }
        if let Some(host) = lookup("CROSSTRAIL_HOST").filter(|v| !v.trim().is_empty()) {
            cfg.host = host
                .trim()
                .parse()
                .with_context(|| format!("CROSSTRAIL_HOST must be an IP address, got {host:?}"))?;
        }
        Ok(cfg)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.addr().port(), 3333);
    }

    #[test]
    fn reads_port_and_host() {
        let cfg =
            ServerConfig::from_lookup(lookup(&[("PORT", "8080"), ("CROSSTRAIL_HOST", "127.0.0.1")]))
                .unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn empty_port_falls_back_to_default() {
        let cfg = ServerConfig::from_lookup(lookup(&[("PORT", "")])).unwrap();
        assert_eq!(cfg.port, 3333);
    }

    #[test]
    fn non_numeric_port_is_an_error() {
        assert!(ServerConfig::from_lookup(lookup(&[("PORT", "http")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("PORT", "70000")])).is_err());
    }
}
