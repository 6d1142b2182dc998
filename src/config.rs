use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    // App
    pub app_name: String,
    pub environment: String,

    // Database
    pub database_path: String,
    pub database_pool_size: u32,
    pub database_pool_timeout: u64,
    pub messages_collection: String,

    // JWT
    pub jwt_secret_key: String,
    pub jwt_issuer: String,
    pub jwt_expires_seconds: u64,

    // Password hashing
    pub bcrypt_cost: u32,

    // Logging
    pub log_level: String,
    pub log_format: String,
}

impl Settings {
    /// Read settings after loading a `.env` file from the working directory, if present.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self {
            app_name: env::var("APP_NAME").unwrap_or("Group Chat Store".into()),
            environment: env::var("ENVIRONMENT").unwrap_or("development".into()),

            database_path: env::var("DATABASE_PATH").unwrap_or("data/group_chat.db".into()),
            database_pool_size: env::var("DATABASE_POOL_SIZE")
                .unwrap_or("10".into())
                .parse()
                .unwrap_or(10),
            database_pool_timeout: env::var("DATABASE_POOL_TIMEOUT")
                .unwrap_or("60".into())
                .parse()
                .unwrap_or(60),
            messages_collection: env::var("MESSAGES_COLLECTION").unwrap_or("messages".into()),

            jwt_secret_key: env::var("JWT_SECRET_KEY").unwrap_or_default(),
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or("group_chat".into()),
            jwt_expires_seconds: env::var("JWT_EXPIRES_SECONDS")
                .unwrap_or("3600".into())
                .parse()
                .unwrap_or(3600),

            bcrypt_cost: env::var("BCRYPT_COST")
                .unwrap_or("10".into())
                .parse()
                .unwrap_or(10),

            log_level: env::var("LOG_LEVEL").unwrap_or("info".into()),
            log_format: env::var("LOG_FORMAT").unwrap_or("json".into()),
        }
    }

    /// SQLite connection URL for `database_path`. `:memory:` selects an in-memory database.
    pub fn database_url(&self) -> String {
        if self.is_in_memory() {
            return "sqlite::memory:".to_string();
        }
        format!("sqlite://{}", self.database_path)
    }

    #[inline]
    pub fn is_in_memory(&self) -> bool {
        self.database_path == ":memory:"
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Group Chat Store".into(),
            environment: "development".into(),
            database_path: ":memory:".into(),
            database_pool_size: 1,
            database_pool_timeout: 60,
            messages_collection: "messages".into(),
            jwt_secret_key: String::new(),
            jwt_issuer: "group_chat".into(),
            jwt_expires_seconds: 3600,
            bcrypt_cost: 10,
            log_level: "info".into(),
            log_format: "text".into(),
        }
    }
}
