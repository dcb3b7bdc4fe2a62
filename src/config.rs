// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Runtime settings from flags and environment.

use std::{ffi::OsString, net::SocketAddr};

use clap::{CommandFactory, FromArgMatches, Parser};
use url::Url;

/// Default QR rendering service.
pub const DEFAULT_QR_SERVICE: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Server settings.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about)]
pub struct Settings {
    /// Address to listen on.
    #[arg(long, env = "ELABEL_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// PostgreSQL connection string. Without it records live in memory.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Upper bound on pooled database connections.
    #[arg(long, env = "ELABEL_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Bearer token required on `/api` routes. Unset disables the check.
    #[arg(long, env = "ELABEL_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,

    /// Origin of the public label pages, e.g. `https://labels.example.com`.
    #[arg(long, env = "ELABEL_PUBLIC_BASE_URL", default_value = "http://localhost:3000")]
    pub public_base_url: Url,

    /// QR rendering service; receives `size` and `data` query parameters.
    #[arg(long, env = "ELABEL_QR_SERVICE_URL", default_value = DEFAULT_QR_SERVICE)]
    pub qr_service_url: Url,

    /// Log filter directives.
    #[arg(long = "log", env = "RUST_LOG", default_value = "elabel=info,tower_http=info")]
    pub log_filter: String
}

impl Settings {
    /// Settings from command line arguments alone, ignoring the
    /// environment.
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone
    {
        let matches = Self::command()
            .mut_args(|arg| arg.env(None))
            .try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    /// Settings with every default, no database and no token.
    pub fn local() -> Result<Self, clap::Error> {
        Self::from_args(["elabel"])
    }

    /// Same settings guarded by `token`.
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let settings = Settings::from_args(["elabel"]).unwrap();
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.qr_service_url.as_str(), DEFAULT_QR_SERVICE);
    }

    #[test]
    fn flags_override_defaults() {
        let settings = Settings::from_args([
            "elabel",
            "--bind",
            "127.0.0.1:8080",
            "--admin-token",
            "secret",
            "--public-base-url",
            "https://labels.example.com"
        ])
        .unwrap();
        assert_eq!(settings.bind.port(), 8080);
        assert_eq!(settings.admin_token.as_deref(), Some("secret"));
        assert_eq!(settings.public_base_url.host_str(), Some("labels.example.com"));
    }

    #[test]
    fn rejects_malformed_urls() {
        assert!(Settings::from_args(["elabel", "--public-base-url", "not a url"]).is_err());
    }

    #[test]
    fn local_ignores_environment() {
        // Every other test here parses through `from_args`, so no reader
        // races with this write.
        unsafe { std::env::set_var("ELABEL_PUBLIC_BASE_URL", "not a url") };
        let settings = Settings::local().unwrap();
        unsafe { std::env::remove_var("ELABEL_PUBLIC_BASE_URL") };

        assert_eq!(settings.public_base_url.as_str(), "http://localhost:3000/");
        assert!(settings.admin_token.is_none());
        assert!(settings.database_url.is_none());
    }
}
