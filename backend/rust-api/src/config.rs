use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub bind_address: String,
    pub gemini_endpoint: String,
    pub gemini_model: String,
    pub gemini_api_key: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load environment variables from root .env file (two levels up)
        // Try root .env first, then fallback to local .env
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            // Fallback to current directory .env for backward compatibility
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            // Load base config from TOML file
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        // Extract values with fallbacks to ENV or defaults
        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGODB_URI"))
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| {
                eprintln!("WARNING: MONGODB_URI not set, using local default");
                "mongodb://localhost:27017".to_string()
            });

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "anicodes".to_string());

        let bind_address = settings
            .get_string("server.bind_address")
            .or_else(|_| env::var("BIND_ADDRESS"))
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let gemini_endpoint = settings
            .get_string("gemini.endpoint")
            .or_else(|_| env::var("GEMINI_ENDPOINT"))
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());

        let gemini_model = settings
            .get_string("gemini.model")
            .or_else(|_| env::var("GEMINI_MODEL"))
            .unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        let gemini_api_key = settings
            .get_string("gemini.api_key")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .unwrap_or_else(|_| {
                if env == "prod" {
                    panic!("FATAL: GEMINI_API_KEY must be set in production!");
                }
                eprintln!("WARNING: Using placeholder GEMINI_API_KEY (dev mode only!)");
                "dev-key-only-for-local-testing".to_string()
            });

        Ok(Config {
            mongo_uri,
            mongo_database,
            bind_address,
            gemini_endpoint,
            gemini_model,
            gemini_api_key,
        })
    }
}
