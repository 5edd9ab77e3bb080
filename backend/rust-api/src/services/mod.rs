use crate::config::Config;
use mongodb::{Client as MongoClient, Database};

pub struct AppState {
    pub config: Config,
    pub mongo: Database,
}

impl AppState {
    pub fn new(config: Config, mongo_client: MongoClient) -> Self {
        let mongo = mongo_client.database(&config.mongo_database);
        Self { config, mongo }
    }
}

pub mod chat_service;
pub mod course_service;
pub mod problem_service;
pub mod progress_service;
