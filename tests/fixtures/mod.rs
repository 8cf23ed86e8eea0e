//! Test fixtures: an application schema and helpers for file-backed tests.
//!
//! The schema mirrors a small service configuration:
//! - `app.port`
//! - `db.{host, name, user, password, port}`
//! - `logging.logDbQuereis`

#![allow(dead_code)]

use cfglayer::{ConfiguratorOptions, FieldSpec, ObjectSchema, Schema};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

static APP: ObjectSchema = ObjectSchema {
    fields: &[FieldSpec::integer("port").range(1, 65535)],
};

static DB: ObjectSchema = ObjectSchema {
    fields: &[
        FieldSpec::string("host").non_empty(),
        FieldSpec::string("name"),
        FieldSpec::string("user"),
        FieldSpec::string("password"),
        FieldSpec::integer("port").range(1, 65535),
    ],
};

static LOGGING: ObjectSchema = ObjectSchema {
    fields: &[FieldSpec::boolean("logDbQuereis").optional()],
};

static CONFIG: ObjectSchema = ObjectSchema {
    fields: &[
        FieldSpec::object("app", &APP),
        FieldSpec::object("db", &DB),
        FieldSpec::object("logging", &LOGGING),
    ],
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(
        rename = "logDbQuereis",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub log_db_queries: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<DbConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

impl Schema for Config {
    fn schema() -> &'static ObjectSchema {
        &CONFIG
    }
}

impl Config {
    pub fn db_port(&self) -> Option<i64> {
        self.db.as_ref().and_then(|db| db.port)
    }

    pub fn db_host(&self) -> Option<&str> {
        self.db.as_ref().and_then(|db| db.host.as_deref())
    }

    pub fn app_port(&self) -> Option<i64> {
        self.app.as_ref().and_then(|app| app.port)
    }
}

/// Sparse override touching only `db.port`.
pub fn db_port(port: i64) -> Config {
    Config {
        db: Some(DbConfig {
            port: Some(port),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Sparse override touching only `app.port`.
pub fn app_port(port: i64) -> Config {
    Config {
        app: Some(AppConfig { port: Some(port) }),
        ..Default::default()
    }
}

/// Path to a checked-in config fixture
pub fn config_fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/configs")
        .join(name)
}

pub const GOOD_CONFIG: &str = r#"{
    "app": {"port": 3000},
    "db": {"host": "localhost", "name": "orders", "user": "svc", "password": "secret", "port": 5432},
    "logging": {"logDbQuereis": true}
}"#;

/// Temporary workspace with its own override file location.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn adds_path(&self) -> PathBuf {
        self.path("runtime/config-adds/config-adds.json")
    }

    /// Options for `global`, with the override file kept inside the workspace.
    pub fn options(&self, global: impl Into<PathBuf>) -> ConfiguratorOptions {
        ConfiguratorOptions::new(global).with_adds_path(self.adds_path())
    }
}
