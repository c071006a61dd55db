use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::intake::IntakeLimits;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DATABASE_URI: &str = "mongodb://localhost:27017/farmtrust";

/// Everything the service needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub limits: IntakeLimits,
    pub request_timeout: Duration,
    /// Accepted for compatibility with deployments that set it. Nothing connects to it.
    pub database_uri: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            limits: IntakeLimits::default(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            database_uri: DEFAULT_DATABASE_URI.to_owned(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from any key/value source; absent or unparsable
    /// values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let limits = IntakeLimits {
            max_files: parse_nonzero_or(&lookup, "FARMTRUST_MAX_FILES", defaults.limits.max_files),
            max_file_size: parse_nonzero_or(
                &lookup,
                "FARMTRUST_MAX_FILE_SIZE",
                defaults.limits.max_file_size,
            ),
        };
        Self {
            bind: parse_or(&lookup, "FARMTRUST_BIND", defaults.bind),
            port: parse_or(&lookup, "PORT", defaults.port),
            upload_dir: lookup("FARMTRUST_UPLOAD_DIR")
                .filter(|v| !v.trim().is_empty())
                .map_or(defaults.upload_dir, PathBuf::from),
            limits,
            request_timeout: Duration::from_secs(parse_nonzero_or(
                &lookup,
                "FARMTRUST_REQUEST_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            database_uri: lookup("MONGODB_URI").unwrap_or(defaults.database_uri),
        }
    }

    #[must_use]
    pub fn socket(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Whole request cap: every photo at its limit plus room for form boundaries.
    #[must_use]
    pub fn body_limit(&self) -> usize {
        let photos = self
            .limits
            .max_file_size
            .saturating_mul(self.limits.max_files as u64);
        usize::try_from(photos)
            .unwrap_or(usize::MAX)
            .saturating_add(1024 * 1024)
    }

    /// Database URI with credentials masked, for logging.
    #[must_use]
    pub fn redacted_database_uri(&self) -> String {
        let uri = &self.database_uri;
        let Some(scheme_end) = uri.find("://") else {
            return uri.clone();
        };
        let rest = &uri[scheme_end + 3..];
        match rest.rfind('@') {
            Some(at) => format!("{}://***@{}", &uri[..scheme_end], &rest[at + 1..]),
            None => uri.clone(),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    parse_where(lookup, key, default, |_| true)
}

/// Like `parse_or`, but zero is treated as invalid.
fn parse_nonzero_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Default + PartialEq,
    F: Fn(&str) -> Option<String>,
{
    parse_where(lookup, key, default, |v| *v != T::default())
}

fn parse_where<T, F, P>(lookup: &F, key: &str, default: T, valid: P) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
    P: Fn(&T) -> bool,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) if valid(&value) => value,
        _ => {
            tracing::warn!("ignoring invalid {key} value '{raw}', using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        // Act
        let c = config(&[]);

        // Assert
        assert_eq!(c, ServerConfig::default());
        assert_eq!(c.port, 5000);
        assert_eq!(c.limits.max_files, 3);
        assert_eq!(c.socket().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn values_from_lookup() {
        // Act
        let c = config(&[
            ("PORT", "8080"),
            ("FARMTRUST_BIND", "127.0.0.1"),
            ("FARMTRUST_UPLOAD_DIR", "/var/lib/farmtrust"),
            ("FARMTRUST_MAX_FILES", "5"),
            ("FARMTRUST_MAX_FILE_SIZE", "2048"),
            ("FARMTRUST_REQUEST_TIMEOUT_SECS", "5"),
            ("MONGODB_URI", "mongodb://db:27017/x"),
        ]);

        // Assert
        assert_eq!(c.socket().to_string(), "127.0.0.1:8080");
        assert_eq!(c.upload_dir, PathBuf::from("/var/lib/farmtrust"));
        assert_eq!(
            c.limits,
            IntakeLimits {
                max_files: 5,
                max_file_size: 2048
            }
        );
        assert_eq!(c.request_timeout, Duration::from_secs(5));
        assert_eq!(c.database_uri, "mongodb://db:27017/x");
    }

    #[rstest]
    #[case("PORT", "not-a-port")]
    #[case("PORT", "70000")]
    #[case("FARMTRUST_MAX_FILES", "-1")]
    #[case("FARMTRUST_MAX_FILES", "0")]
    #[case("FARMTRUST_MAX_FILE_SIZE", "0")]
    #[case("FARMTRUST_REQUEST_TIMEOUT_SECS", "0")]
    #[case("FARMTRUST_BIND", "localhost:1")]
    #[case("FARMTRUST_UPLOAD_DIR", "  ")]
    #[trace]
    fn invalid_values_keep_defaults(#[case] key: &str, #[case] value: &str) {
        // Act
        let c = config(&[(key, value)]);

        // Assert
        assert_eq!(c, ServerConfig::default());
    }

    #[test]
    fn body_limit_covers_all_photos() {
        // Arrange
        let c = config(&[("FARMTRUST_MAX_FILES", "2"), ("FARMTRUST_MAX_FILE_SIZE", "100")]);

        // Act
        let limit = c.body_limit();

        // Assert
        assert_eq!(limit, 200 + 1024 * 1024);
    }

    #[rstest]
    #[case("mongodb://localhost:27017/farmtrust", "mongodb://localhost:27017/farmtrust")]
    #[case("mongodb://user:pass@db:27017/x", "mongodb://***@db:27017/x")]
    #[case("garbage", "garbage")]
    #[trace]
    fn redacted_database_uri_tests(#[case] uri: &str, #[case] expected: &str) {
        // Arrange
        let c = config(&[("MONGODB_URI", uri)]);

        // Act
        let redacted = c.redacted_database_uri();

        // Assert
        assert_eq!(redacted, expected);
    }
}
