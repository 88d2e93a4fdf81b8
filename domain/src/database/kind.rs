//! Database kind inferred from a connection URI scheme

use serde::{Deserialize, Serialize};

/// Kind of database behind a connection URI (Value Object)
///
/// Derived deterministically from the URI scheme prefix; never guessed
/// from the rest of the URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbKind {
    Mysql,
    Postgres,
    Mongo,
    Redis,
    Sqlite,
    #[default]
    Unknown,
}

impl DbKind {
    /// Infer the kind from the scheme prefix of `uri`.
    ///
    /// The scheme is everything before the first `:`; driver suffixes such as
    /// `mysql+pymysql` or `mongodb+srv` are accepted. Matching ignores case.
    pub fn from_uri(uri: &str) -> Self {
        let uri = uri.trim();
        let Some((scheme, _)) = uri.split_once(':') else {
            return DbKind::Unknown;
        };
        let scheme = scheme.to_ascii_lowercase();
        let base = scheme.split('+').next().unwrap_or_default();

        match base {
            "mysql" | "mariadb" => DbKind::Mysql,
            "postgres" | "postgresql" => DbKind::Postgres,
            "mongodb" => DbKind::Mongo,
            "redis" | "rediss" => DbKind::Redis,
            "sqlite" | "sqlite3" => DbKind::Sqlite,
            _ => DbKind::Unknown,
        }
    }

    /// Label used in prompts, exports and session display
    pub fn label(&self) -> &'static str {
        match self {
            DbKind::Mysql => "mysql",
            DbKind::Postgres => "postgres",
            DbKind::Mongo => "mongo",
            DbKind::Redis => "redis",
            DbKind::Sqlite => "sqlite",
            DbKind::Unknown => "unknown",
        }
    }

    /// Human-readable name of the query dialect spoken by this kind
    pub fn dialect(&self) -> &'static str {
        match self {
            DbKind::Mysql => "MySQL SQL",
            DbKind::Postgres => "PostgreSQL SQL",
            DbKind::Sqlite => "SQLite SQL",
            DbKind::Mongo => "MongoDB query",
            DbKind::Redis => "Redis command",
            DbKind::Unknown => "SQL",
        }
    }

    /// Whether statements for this kind are SQL
    pub fn is_sql(&self) -> bool {
        matches!(self, DbKind::Mysql | DbKind::Postgres | DbKind::Sqlite)
    }

    /// All kinds that a URI scheme can map to
    pub fn all() -> [DbKind; 6] {
        [
            DbKind::Mysql,
            DbKind::Postgres,
            DbKind::Mongo,
            DbKind::Redis,
            DbKind::Sqlite,
            DbKind::Unknown,
        ]
    }
}

impl std::fmt::Display for DbKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
