use std::path::PathBuf;

use anyhow::Context;

/// Credentials shared by the direct and Cloud SQL MySQL modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlCredentials {
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Which backend every connection goes to. Decided once, at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    Sqlite {
        path: PathBuf,
    },
    CloudSql {
        instance: String,
        socket_dir: PathBuf,
        credentials: MySqlCredentials,
    },
    MySql {
        host: String,
        port: u16,
        credentials: MySqlCredentials,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseConfig::from_lookup(&lookup)?;
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = lookup("PORT")
            .or_else(|| lookup("APP_PORT"))
            .map(|v| v.parse::<u16>().with_context(|| format!("invalid port {v:?}")))
            .transpose()?
            .unwrap_or(8080);
        Ok(Self {
            database,
            host,
            port,
        })
    }
}

impl DatabaseConfig {
    fn from_lookup<F>(lookup: &F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if use_sqlite(lookup("USE_SQLITE").as_deref()) {
            let path = lookup("SQLITE_DB").unwrap_or_else(|| "local.db".into());
            return Ok(Self::Sqlite { path: path.into() });
        }

        let credentials = MySqlCredentials {
            user: lookup("DB_USER").unwrap_or_else(|| "appuser".into()),
            password: lookup("DB_PASS").unwrap_or_default(),
            database: lookup("DB_NAME").unwrap_or_else(|| "appdb".into()),
        };

        if let Some(instance) = lookup("INSTANCE_CONNECTION_NAME").filter(|v| !v.is_empty()) {
            let socket_dir = lookup("CLOUD_SQL_SOCKET_DIR").unwrap_or_else(|| "/cloudsql".into());
            return Ok(Self::CloudSql {
                instance,
                socket_dir: socket_dir.into(),
                credentials,
            });
        }

        let port = match lookup("DB_PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("invalid DB_PORT {v:?}"))?,
            None => 3306,
        };
        Ok(Self::MySql {
            host: lookup("DB_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port,
            credentials,
        })
    }

    pub fn is_sqlite(&self) -> bool {
        matches!(self, Self::Sqlite { .. })
    }
}

fn use_sqlite(flag: Option<&str>) -> bool {
    matches!(
        flag.map(|v| v.to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn sqlite_wins_over_cloud_instance() {
        let cfg = load(&[
            ("USE_SQLITE", "TRUE"),
            ("SQLITE_DB", "/tmp/users.db"),
            ("INSTANCE_CONNECTION_NAME", "proj:region:inst"),
        ])
        .unwrap();
        assert_eq!(
            cfg.database,
            DatabaseConfig::Sqlite {
                path: "/tmp/users.db".into()
            }
        );
    }

    #[test]
    fn sqlite_flag_must_be_truthy() {
        let cfg = load(&[("USE_SQLITE", "0")]).unwrap();
        assert!(!cfg.database.is_sqlite());
    }

    #[test]
    fn cloud_instance_uses_socket_dir() {
        let cfg = load(&[
            ("INSTANCE_CONNECTION_NAME", "proj:region:inst"),
            ("DB_USER", "svc"),
            ("DB_PASS", "pw"),
        ])
        .unwrap();
        match cfg.database {
            DatabaseConfig::CloudSql {
                instance,
                socket_dir,
                credentials,
            } => {
                assert_eq!(instance, "proj:region:inst");
                assert_eq!(socket_dir, PathBuf::from("/cloudsql"));
                assert_eq!(credentials.user, "svc");
                assert_eq!(credentials.password, "pw");
                assert_eq!(credentials.database, "appdb");
            }
            other => panic!("unexpected backend: {other:?}"),
        }
    }

    #[test]
    fn direct_mysql_defaults() {
        let cfg = load(&[]).unwrap();
        assert_eq!(
            cfg.database,
            DatabaseConfig::MySql {
                host: "127.0.0.1".into(),
                port: 3306,
                credentials: MySqlCredentials {
                    user: "appuser".into(),
                    password: String::new(),
                    database: "appdb".into(),
                },
            }
        );
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn port_prefers_port_over_app_port() {
        let cfg = load(&[("PORT", "9000"), ("APP_PORT", "9001")]).unwrap();
        assert_eq!(cfg.port, 9000);
        let cfg = load(&[("APP_PORT", "9001")]).unwrap();
        assert_eq!(cfg.port, 9001);
    }

    #[test]
    fn invalid_ports_are_rejected() {
        assert!(load(&[("PORT", "eighty")]).is_err());
        assert!(load(&[("DB_PORT", "-1")]).is_err());
    }
}
