use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub site_name: String,
    pub registration: RegistrationMode,
    pub max_body_size: usize,
    pub upload_dir: PathBuf,
    pub reset_token_ttl: Duration,
    pub mail_timeout: Duration,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationMode {
    Open,
    Closed,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let session_secret = env_required("SESSION_SECRET")?;

        let host: IpAddr = env_or("DEPTSITE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid DEPTSITE_HOST: {e}"))?;

        let port: u16 = env_or("DEPTSITE_PORT", "5000")
            .parse()
            .map_err(|e| format!("Invalid DEPTSITE_PORT: {e}"))?;

        let base_url = env_or("DEPTSITE_BASE_URL", &format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        let site_name = env_or("DEPTSITE_SITE_NAME", "Department Website");

        let registration = match env_or("DEPTSITE_REGISTRATION", "open").as_str() {
            "closed" => RegistrationMode::Closed,
            _ => RegistrationMode::Open,
        };

        let max_body_size: usize = env_or("DEPTSITE_MAX_BODY_SIZE", "10485760")
            .parse()
            .map_err(|e| format!("Invalid DEPTSITE_MAX_BODY_SIZE: {e}"))?;

        let upload_dir = PathBuf::from(env_or("DEPTSITE_UPLOAD_DIR", "public"));

        let reset_token_ttl = env_or("DEPTSITE_RESET_TOKEN_TTL_SECS", "600")
            .parse()
            .map(Duration::from_secs)
            .map_err(|e| format!("Invalid DEPTSITE_RESET_TOKEN_TTL_SECS: {e}"))?;

        let mail_timeout = env_or("DEPTSITE_MAIL_TIMEOUT_SECS", "10")
            .parse()
            .map(Duration::from_secs)
            .map_err(|e| format!("Invalid DEPTSITE_MAIL_TIMEOUT_SECS: {e}"))?;

        let log_level = env_or("DEPTSITE_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("DEPTSITE_SMTP_HOST").ok(),
            std::env::var("DEPTSITE_SMTP_PORT").ok(),
            std::env::var("DEPTSITE_SMTP_USER").ok(),
            std::env::var("DEPTSITE_SMTP_PASS").ok(),
            std::env::var("DEPTSITE_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid DEPTSITE_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            session_secret,
            host,
            port,
            base_url,
            site_name,
            registration,
            max_body_size,
            upload_dir,
            reset_token_ttl,
            mail_timeout,
            log_level,
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
