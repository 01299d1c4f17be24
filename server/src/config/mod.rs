use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::models::DEFAULT_TICKET_TYPES;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_PAYMENT_URL: &str = "payment.html";
const DEFAULT_NOTICE_SECS: u64 = 3;
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

const PLACEHOLDER_URL: &str = "YOUR_SUPABASE_URL";
const PLACEHOLDER_KEY: &str = "YOUR_SUPABASE_ANON_KEY";

/// Page flows the service can host side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Registration,
    Admin,
    Checkin,
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "registration" => Ok(Page::Registration),
            "admin" => Ok(Page::Admin),
            "checkin" | "check-in" => Ok(Page::Checkin),
            other => Err(format!("unknown page '{}'", other)),
        }
    }
}

/// Remote table endpoint; only present when both values are real.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub url: String,
    pub access_key: String,
}

impl RemoteSettings {
    pub fn from_values(url: Option<String>, access_key: Option<String>) -> Option<Self> {
        let url = url.map(|v| v.trim().to_string())?;
        let access_key = access_key.map(|v| v.trim().to_string())?;
        if url.is_empty() || url == PLACEHOLDER_URL {
            return None;
        }
        if access_key.is_empty() || access_key == PLACEHOLDER_KEY {
            return None;
        }
        Some(Self { url, access_key })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub data_dir: PathBuf,
    pub remote: Option<RemoteSettings>,
    pub remote_timeout: Duration,
    pub pages: Vec<Page>,
    pub ticket_types: Vec<String>,
    pub payment_url: String,
    pub checkin_notice: Duration,
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            remote: None,
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
            pages: vec![Page::Registration, Page::Admin, Page::Checkin],
            ticket_types: DEFAULT_TICKET_TYPES.iter().map(|t| t.to_string()).collect(),
            payment_url: DEFAULT_PAYMENT_URL.to_string(),
            checkin_notice: Duration::from_secs(DEFAULT_NOTICE_SECS),
            production: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = parse_var::<IpAddr>("HTRAINING_HOST").unwrap_or(defaults.addr.ip());
        let port = parse_var::<u16>("HTRAINING_PORT").unwrap_or(DEFAULT_PORT);

        let pages = env::var("HTRAINING_PAGES")
            .ok()
            .map(|v| parse_pages(&v))
            .filter(|pages| !pages.is_empty())
            .unwrap_or(defaults.pages);

        let ticket_types = env::var("HTRAINING_TICKET_TYPES")
            .ok()
            .map(|v| split_list(&v))
            .filter(|types| !types.is_empty())
            .unwrap_or(defaults.ticket_types);

        Self {
            addr: SocketAddr::new(host, port),
            data_dir: env::var("HTRAINING_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            remote: RemoteSettings::from_values(
                env::var("SUPABASE_URL").ok(),
                env::var("SUPABASE_ANON_KEY").ok(),
            ),
            remote_timeout: parse_var::<u64>("REMOTE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.remote_timeout),
            pages,
            ticket_types,
            payment_url: env::var("PAYMENT_URL").unwrap_or(defaults.payment_url),
            checkin_notice: parse_var::<u64>("CHECKIN_NOTICE_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.checkin_notice),
            production: env::var("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
        }
    }

    pub fn serves(&self, page: Page) -> bool {
        self.pages.contains(&page)
    }
}

fn parse_var<T>(name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Config: ignoring invalid {}='{}': {}", name, raw, e);
            None
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_pages(raw: &str) -> Vec<Page> {
    let mut pages = Vec::new();
    for item in split_list(raw) {
        match item.parse::<Page>() {
            Ok(page) if !pages.contains(&page) => pages.push(page),
            Ok(_) => {}
            Err(e) => tracing::warn!("Config: {}", e),
        }
    }
    pages
}
