use mongodb::{Client, Database};
use std::env;

use crate::errors::AppError;

pub async fn init_database() -> Result<Database, AppError> {
    let mongodb_uri = env::var("MONGODB_URI").map_err(|_| {
        AppError::Config("Database connection string is missing or malformed".to_string())
    })?;
    let db_name = env::var("DATABASE_NAME").unwrap_or_else(|_| "estatehub".to_string());

    log::info!("Connecting to MongoDB database: {}", db_name);

    let client = Client::with_uri_str(&mongodb_uri).await?;

    // Test the connection
    match client.list_database_names(None, None).await {
        Ok(_) => {
            log::info!("Successfully connected to MongoDB");
        }
        Err(e) => {
            log::error!("Failed to list databases: {}", e);
        }
    }

    Ok(client.database(&db_name))
}

pub fn get_jwt_secret() -> Result<String, AppError> {
    env::var("JWT_SECRET").map_err(|_| {
        AppError::Config("Server misconfigured: JWT signing secret is not set".to_string())
    })
}

pub fn get_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

pub fn get_frontend_url() -> Option<String> {
    env::var("FRONTEND_URL").ok()
}
