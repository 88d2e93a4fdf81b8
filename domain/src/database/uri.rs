//! Connection URI value object

use crate::core::error::DomainError;
use crate::database::kind::DbKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Placeholder shown instead of a password
pub const REDACTED: &str = "***";

/// Where a SQLite URI points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteTarget {
    Memory,
    File(PathBuf),
}

/// A database connection URI exactly as the user typed it (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionUri {
    raw: String,
    kind: DbKind,
}

impl ConnectionUri {
    /// Parse a URI, requiring a `scheme:` prefix and no embedded whitespace.
    ///
    /// The kind may be [`DbKind::Unknown`]; whether that kind can be
    /// connected to is decided by the connection delegate.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into().trim().to_string();
        if raw.is_empty() {
            return Err(DomainError::InvalidUri("URI is empty".to_string()));
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidUri(format!(
                "URI must not contain whitespace: {}",
                raw
            )));
        }
        let Some((scheme, _)) = raw.split_once(':') else {
            return Err(DomainError::InvalidUri(format!(
                "missing scheme (expected e.g. sqlite:///file.db): {}",
                raw
            )));
        };
        if scheme.is_empty()
            || !scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        {
            return Err(DomainError::InvalidUri(format!("invalid scheme: {}", raw)));
        }

        let kind = DbKind::from_uri(&raw);
        Ok(Self { raw, kind })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> DbKind {
        self.kind
    }

    /// The URI with any password replaced by [`REDACTED`]
    pub fn redacted(&self) -> String {
        match Url::parse(&self.raw) {
            Ok(mut url) if url.password().is_some() => {
                if url.set_password(Some(REDACTED)).is_ok() {
                    url.to_string()
                } else {
                    self.raw.clone()
                }
            }
            _ => self.raw.clone(),
        }
    }

    /// The URI in the form sqlx expects.
    ///
    /// Driver suffixes (`mysql+pymysql`, `postgresql+psycopg2`) and aliases
    /// (`mariadb`, `postgresql`) become the plain scheme. SQLite files are
    /// rendered as `sqlite://<path>?mode=rwc` so a relative path stays
    /// relative.
    pub fn driver_url(&self) -> String {
        self.to_driver_form(&self.raw)
    }

    /// [`Self::driver_url`] with any password replaced by [`REDACTED`]
    pub fn redacted_driver_url(&self) -> String {
        self.to_driver_form(&self.redacted())
    }

    fn to_driver_form(&self, raw: &str) -> String {
        if let Some(target) = self.sqlite_target() {
            return match target {
                SqliteTarget::Memory => "sqlite::memory:".to_string(),
                SqliteTarget::File(path) => format!("sqlite://{}?mode=rwc", path.display()),
            };
        }
        let Some((_, rest)) = raw.split_once(':') else {
            return raw.to_string();
        };
        let scheme = match self.kind {
            DbKind::Postgres => "postgres",
            DbKind::Mysql => "mysql",
            _ => return raw.to_string(),
        };
        format!("{}:{}", scheme, rest)
    }

    /// Short name of the database: the last path segment, or `"database"`.
    pub fn database_name(&self) -> String {
        if let Some(SqliteTarget::File(path)) = self.sqlite_target() {
            return path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "database".to_string());
        }
        if let Some(SqliteTarget::Memory) = self.sqlite_target() {
            return ":memory:".to_string();
        }

        let without_query = self.raw.split(['?', '#']).next().unwrap_or_default();
        let after_scheme = without_query
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(without_query);
        match after_scheme.split_once('/') {
            Some((_, path)) => match path.rsplit('/').find(|s| !s.is_empty()) {
                Some(name) => name.to_string(),
                None => "database".to_string(),
            },
            None => "database".to_string(),
        }
    }

    /// Resolve the target of a SQLite URI.
    ///
    /// Slash counts follow the common `sqlite:///relative.db` and
    /// `sqlite:////absolute/path.db` convention. Returns `None` for
    /// non-SQLite URIs.
    pub fn sqlite_target(&self) -> Option<SqliteTarget> {
        if self.kind != DbKind::Sqlite {
            return None;
        }
        let (_, rest) = self.raw.split_once(':')?;
        let rest = rest.split('?').next().unwrap_or_default();

        if rest.is_empty() || rest == ":memory:" || rest == "//" || rest.ends_with(":memory:") {
            return Some(SqliteTarget::Memory);
        }

        let path = if let Some(abs) = rest.strip_prefix("////") {
            format!("/{}", abs)
        } else if let Some(rel) = rest.strip_prefix("///") {
            rel.to_string()
        } else if let Some(rel) = rest.strip_prefix("//") {
            rel.to_string()
        } else {
            rest.to_string()
        };
        Some(SqliteTarget::File(PathBuf::from(path)))
    }
}

impl std::fmt::Display for ConnectionUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Find the first whitespace-separated token in `text` that parses as a
/// URI of a known database kind.
///
/// In free text a bare `sqlite:` is prose, so the scheme must be followed by
/// `//` or name `:memory:`.
pub fn find_connection_uri(text: &str) -> Option<ConnectionUri> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '<' | '>' | ',')))
        .filter(|token| {
            token
                .split_once(':')
                .is_some_and(|(_, rest)| rest.starts_with("//") || rest.ends_with(":memory:"))
        })
        .filter_map(|token| ConnectionUri::parse(token).ok())
        .find(|uri| uri.kind() != DbKind::Unknown)
}
