use anyhow::Result;
use config::Config;

pub const DEFAULT_KEYWORDS: [&str; 15] = [
    "oversized linen shirt",
    "cargo pants men",
    "relaxed fit jeans men",
    "chino trousers men",
    "men polo shirt",
    "printed resort shirt",
    "neon graphic tee",
    "men jogger pants",
    "men bomber jacket",
    "men terry shorts",
    "men kurta casual",
    "men denim jacket",
    "men track pants",
    "men waffle tee",
    "men co-ord set",
];

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_addr: String,
    pub keywords: Vec<String>,
    pub marketplace_csv: String,
    pub pinterest_csv: String,
    pub log_dir: Option<String>,

    pub trends_base_url: String,
    pub trends_geo: String,
    pub trends_timeframe: String,
    pub trends_hl: String,
    pub trends_tz: String,
    /// Базовая единица пауз между шагами протокола (мс). 0 отключает паузы.
    pub pacing_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub transport_retries: Option<u32>,
    pub transport_backoff_ms: Option<u64>,

    pub fetch_timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub retry_jitter_ms: Option<u64>,
    pub trends_cache_ttl_secs: Option<u64>,

    pub result_cache_ttl_secs: Option<u64>,
    pub max_concurrent_requests: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server_addr: "0.0.0.0:5000".to_string(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            marketplace_csv: "data/marketplace_data.csv".to_string(),
            pinterest_csv: "data/pinterest_data.csv".to_string(),
            log_dir: None,
            trends_base_url: "https://trends.google.com/trends".to_string(),
            trends_geo: "IN".to_string(),
            trends_timeframe: "today 1-m".to_string(),
            trends_hl: "en-IN".to_string(),
            trends_tz: "-330".to_string(),
            pacing_ms: None,
            request_timeout_secs: None,
            transport_retries: None,
            transport_backoff_ms: None,
            fetch_timeout_secs: None,
            max_attempts: None,
            retry_delay_ms: None,
            retry_jitter_ms: None,
            trends_cache_ttl_secs: None,
            result_cache_ttl_secs: None,
            max_concurrent_requests: None,
        }
    }
}

impl AppConfig {
    pub fn pacing_ms(&self) -> u64 {
        self.pacing_ms.unwrap_or(1_000)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(15)
    }

    pub fn transport_retries(&self) -> u32 {
        self.transport_retries.unwrap_or(3)
    }

    pub fn transport_backoff_ms(&self) -> u64 {
        self.transport_backoff_ms.unwrap_or(500)
    }

    /// Жёсткий лимит на один полный прогон протокола (warm-up, explore, multiline)
    pub fn fetch_timeout_secs(&self) -> u64 {
        self.fetch_timeout_secs.unwrap_or(45)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(2)
    }

    pub fn retry_delay_ms(&self) -> u64 {
        self.retry_delay_ms.unwrap_or(3_000)
    }

    pub fn retry_jitter_ms(&self) -> u64 {
        self.retry_jitter_ms.unwrap_or(1_000)
    }

    pub fn trends_cache_ttl_secs(&self) -> u64 {
        self.trends_cache_ttl_secs.unwrap_or(300)
    }

    pub fn result_cache_ttl_secs(&self) -> u64 {
        self.result_cache_ttl_secs.unwrap_or(43_200)
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests.unwrap_or(1)
    }

    /// Валидация конфигурации
    pub fn validate(&self) -> Result<()> {
        if self.keywords.is_empty() {
            return Err(anyhow::anyhow!("keywords cannot be empty"));
        }

        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(anyhow::anyhow!("keywords cannot contain blank entries"));
        }

        if self.trends_base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("trends_base_url cannot be empty"));
        }

        if self.max_attempts() == 0 {
            return Err(anyhow::anyhow!("max_attempts must be at least 1"));
        }

        if self.request_timeout_secs() == 0 || self.fetch_timeout_secs() == 0 {
            return Err(anyhow::anyhow!("timeouts must be greater than zero"));
        }

        if self.fetch_timeout_secs() < self.request_timeout_secs() {
            return Err(anyhow::anyhow!(
                "fetch_timeout_secs must not be shorter than request_timeout_secs"
            ));
        }

        let max_concurrent = self.max_concurrent_requests();
        if max_concurrent == 0 || max_concurrent > 50 {
            return Err(anyhow::anyhow!("max_concurrent_requests must be between 1 and 50"));
        }

        Ok(())
    }
}

pub fn load_config() -> Result<AppConfig> {
    // Загружаем .env файл
    dotenvy::dotenv().ok();

    let settings = Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(
            config::Environment::with_prefix("TREND_MOMENTUM")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("keywords"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;

    Ok(config)
}
