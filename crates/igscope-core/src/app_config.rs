use std::path::PathBuf;

pub(crate) const DEFAULT_API_BASE_URL: &str = "https://i.instagram.com/";
pub(crate) const DEFAULT_APP_ID: &str = "936619743392459";
pub(crate) const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// May be 0; callers reject it only when it is the effective value.
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    pub retry_base_delay_secs: u64,
    pub api_base_url: String,
    pub app_id: String,
    pub user_agent: String,
    /// Egress proxy URL; may contain a `{session}` placeholder. `None` means direct.
    pub proxy_url: Option<String>,
    pub output_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("concurrency", &self.concurrency)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retry_base_delay_secs", &self.retry_base_delay_secs)
            .field("api_base_url", &self.api_base_url)
            .field("app_id", &self.app_id)
            .field("user_agent", &self.user_agent)
            .field("proxy_url", &self.proxy_url.as_ref().map(|_| "[redacted]"))
            .field("output_path", &self.output_path)
            .finish()
    }
}
