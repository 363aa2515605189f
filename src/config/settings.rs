use lazy_static::lazy_static;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub struct Config {
    pub base_url: String,
    pub host: String,
    pub port: u16,
    pub ytdlp_bin: String,
    pub shows_dir: String,
    pub collections_file: String,
    pub cron_schedule: String,
    pub run_cron_at_start: bool,
    pub cache_ttl_secs: u64,
}

impl Config {
    pub fn new() -> Self {
        let host = env::var("WEBSERVER_HOST").unwrap_or("0.0.0.0".to_string());
        let port = env::var("WEBSERVER_PORT")
            .unwrap_or("9080".to_string())
            .parse()
            .expect("WEBSERVER_PORT must be a valid u16");

        let base_url = env::var("BASE_URL")
            .unwrap_or(format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        let ytdlp_bin = env::var("YTDLP_BIN").unwrap_or("yt-dlp".to_string());
        let shows_dir = env::var("SHOWS_DIR").unwrap_or("/shows".to_string());
        let collections_file =
            env::var("COLLECTIONS_FILE").unwrap_or("/config/collections.json".to_string());

        let cron_schedule = env::var("CRON_SCHEDULE").unwrap_or("5 */2 * * *".to_string());
        let run_cron_at_start = env::var("RUN_CRON_AT_START")
            .map(|v| v == "true")
            .unwrap_or(false);

        let cache_ttl_secs = env::var("CACHE_TTL_SECS")
            .unwrap_or("3600".to_string())
            .parse()
            .expect("CACHE_TTL_SECS must be a number of seconds");

        Self {
            base_url,
            host,
            port,
            ytdlp_bin,
            shows_dir,
            collections_file,
            cron_schedule,
            run_cron_at_start,
            cache_ttl_secs,
        }
    }

    pub fn shows_path(&self) -> PathBuf {
        PathBuf::from(&self.shows_dir)
    }

    pub fn collections_path(&self) -> PathBuf {
        PathBuf::from(&self.collections_file)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::new();
}
