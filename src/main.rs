use std::path::Path;

use tracing::{error, info};

use treevault::{Config, Database, WebServer};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    let mut config = if Path::new(CONFIG_PATH).exists() {
        match Config::load(CONFIG_PATH) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {CONFIG_PATH}: {e}");
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    if let Err(e) = treevault::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        treevault::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.apply_env_overrides().and_then(|()| config.validate()) {
        error!("{e}");
        std::process::exit(1);
    }

    info!("treevault starting");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!(path = %config.database.path, "Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config, db) {
        Ok(server) => server,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server stopped: {e}");
        std::process::exit(1);
    }
}
