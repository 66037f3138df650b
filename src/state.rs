use std::sync::Arc;

use tokio::fs;

use crate::{config::Config, mail::Mailer, store::Store};

pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub mailer: Mailer,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        Self::with_config(Config::load()).await
    }

    pub async fn with_config(config: Config) -> Arc<Self> {
        fs::create_dir_all(&config.data_dir)
            .await
            .expect("Failed to create data directory");
        fs::create_dir_all(&config.uploads_dir)
            .await
            .expect("Failed to create uploads directory");

        let store = Store::new(&config.data_dir);
        let mailer = Mailer::new(config.mail_url.clone(), config.mail_from.clone());

        Arc::new(Self {
            config,
            store,
            mailer,
        })
    }
}
