// config.rs
#[derive(Debug, Clone)]
pub struct PusherConfig {
    pub app_id: String,
    pub key: String,
    pub secret: String,
    pub cluster: String,
}

impl PusherConfig {
    /// All four credentials must be non-empty for the provider to be used.
    pub fn is_complete(&self) -> bool {
        !self.app_id.is_empty()
            && !self.key.is_empty()
            && !self.secret.is_empty()
            && !self.cluster.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    pub redis_url: Option<String>,
    pub upload_dir: String,
    pub cors_origins: Vec<String>,
    // Realtime delivery
    pub pusher: PusherConfig,
    pub pusher_probe_url: String,
    pub pusher_probe_interval_secs: u64,
    pub realtime_relay_url: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");

        let app_url = env_or("APP_URL", "http://localhost:8000");
        let port = env_or("PORT", "8000").parse::<u16>().unwrap_or(8000);

        let redis_url = std::env::var("REDIS_URL").ok().filter(|url| !url.is_empty());
        let upload_dir = env_or("UPLOAD_DIR", "public");

        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173,http://localhost:8000")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let pusher = PusherConfig {
            app_id: env_or("PUSHER_APP_ID", ""),
            key: env_or("PUSHER_APP_KEY", ""),
            secret: env_or("PUSHER_APP_SECRET", ""),
            cluster: env_or("PUSHER_APP_CLUSTER", ""),
        };

        let pusher_probe_url = env_or("PUSHER_PROBE_URL", "https://pusher.com");
        let pusher_probe_interval_secs = env_or("PUSHER_PROBE_INTERVAL_SECS", "60")
            .parse::<u64>()
            .unwrap_or(60);
        let realtime_relay_url = env_or("REALTIME_RELAY_URL", "http://localhost:3001/emit");

        Config {
            database_url,
            app_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().expect("JWT_MAXAGE must be a number of minutes"),
            port,
            redis_url,
            upload_dir,
            cors_origins,
            pusher,
            pusher_probe_url,
            pusher_probe_interval_secs,
            realtime_relay_url,
        }
    }

    /// Absolute URL for a path stored relative to the public directory.
    pub fn asset_url(&self, relative_path: &str) -> String {
        format!(
            "{}/{}",
            self.app_url.trim_end_matches('/'),
            relative_path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Config {
        Config {
            database_url: "postgres://localhost/rentnest_test".to_string(),
            app_url: "http://localhost:8000".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_maxage: 60,
            port: 8000,
            redis_url: None,
            upload_dir: std::env::temp_dir().join("rentnest-test").to_string_lossy().into_owned(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            pusher: PusherConfig {
                app_id: String::new(),
                key: String::new(),
                secret: String::new(),
                cluster: String::new(),
            },
            pusher_probe_url: "http://127.0.0.1:9/".to_string(),
            pusher_probe_interval_secs: 60,
            realtime_relay_url: "http://127.0.0.1:9/emit".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_url_joins_without_double_slash() {
        let mut config = Config::for_tests();
        config.app_url = "https://rentnest.example/".to_string();

        assert_eq!(
            config.asset_url("properties_photos/house_20240101120000.jpg"),
            "https://rentnest.example/properties_photos/house_20240101120000.jpg"
        );
        assert_eq!(
            config.asset_url("/properties_photos/a.png"),
            "https://rentnest.example/properties_photos/a.png"
        );
    }

    #[test]
    fn pusher_requires_every_credential() {
        let mut pusher = Config::for_tests().pusher;
        assert!(!pusher.is_complete());

        pusher.app_id = "1".into();
        pusher.key = "key".into();
        pusher.secret = "secret".into();
        assert!(!pusher.is_complete());

        pusher.cluster = "mt1".into();
        assert!(pusher.is_complete());
    }
}
