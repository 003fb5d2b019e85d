use anyhow::Context;
use std::str::FromStr;

const DEFAULT_DATABASE_URL: &str = "sqlite://table_books.db";
const DEFAULT_SERVER_PORT: u16 = 5000;

#[derive(Debug)]
pub struct Config {
    database_url: String,
    server_port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            load_env("DATABASE_URL")?.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let server_port = load_env("SERVER_PORT")?.unwrap_or(DEFAULT_SERVER_PORT);
        Ok(Self {
            database_url,
            server_port,
        })
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub const fn server_port(&self) -> u16 {
        self.server_port
    }
}

/// Reads `key` from the environment; an unset variable is `None`, a malformed one is an error.
fn load_env<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let Ok(val) = std::env::var(key) else {
        return Ok(None);
    };
    val.parse::<T>()
        .map(Some)
        .with_context(|| format!("Failed to parse environment variable {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variable_is_none() {
        let val: Option<u16> = load_env("BOOKLIST_TEST_UNSET_VARIABLE").unwrap();
        assert!(val.is_none());
    }
}
