use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub mail_url: Option<String>,
    pub mail_from: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("QUILL_PORT", "2000"),
            data_dir: try_load("QUILL_DATA_DIR", "./data"),
            uploads_dir: try_load("QUILL_UPLOADS_DIR", "./uploads"),
            mail_url: var("QUILL_MAIL_URL").ok(),
            mail_from: try_load("QUILL_MAIL_FROM", "no-reply@quill.local"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
