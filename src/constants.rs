use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_THREADS: u16 = 50;

pub const DEFAULT_TIMEOUT_SECS: &str = "5";

/// A progress line is printed every this many completed checks.
pub const PROGRESS_INTERVAL: usize = 100;

pub const MAX_REDIRECTS: usize = 10;

/// Labels probed when no wordlist is given. Contains repeats; the loader dedupes.
pub const COMMON_SUBDOMAINS: &[&str] = &[
    "www", "mail", "ftp", "localhost", "webmail", "smtp", "pop", "ns1", "webdisk",
    "ns2", "cpanel", "whm", "autodiscover", "autoconfig", "ns", "test", "admin",
    "blog", "dev", "api", "secure", "vpn", "mobile", "shop", "app", "cdn", "m",
    "email", "portal", "support", "forum", "news", "media", "static", "docs",
    "store", "shop", "db", "sql", "backup", "old", "new", "beta", "staging",
    "mail2", "test", "live", "search", "images", "img", "download", "uploads",
    "video", "music", "demo", "help", "kb", "wiki", "status", "monitor",
    "payment", "billing", "invoice", "secure", "ssl", "cdn", "cloud", "server",
    "serv", "service", "services", "app", "apps", "office", "remote", "share",
    "shared", "sharepoint", "ftp", "file", "files", "doc", "docs", "document",
    "map", "yiyan", "chat", "baijiahao", "ti", "zhidao",
];

pub static USER_AGENTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15",
    ]
});

/// ASCII (post-IDNA) hostname with at least two labels.
pub static DOMAIN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$")
        .expect("static domain pattern")
});
