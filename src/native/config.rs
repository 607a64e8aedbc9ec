//! Settings read from a krb5.conf file.

use crate::core::{ProtoResult, ProtocolError};
use chrono::Duration;
use log::debug;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::Path;

pub const CONFIG_ENVVAR: &str = "KRB5_CONFIG";
pub const CCACHE_ENVVAR: &str = "KRB5CCNAME";
pub const DEFAULT_CONFIG_PATH: &str = "/etc/krb5.conf";
pub const KDC_PORT: u16 = 88;

#[derive(Debug, Clone, PartialEq)]
pub struct Krb5Config {
    pub default_realm: Option<String>,
    pub default_ccache_name: Option<String>,
    pub ticket_lifetime: Duration,
    pub renew_lifetime: Option<Duration>,
    pub forwardable: bool,
    pub proxiable: bool,
    /// Messages larger than this go over TCP. 1 means always TCP.
    pub udp_preference_limit: usize,
    pub dns_lookup_kdc: bool,
    /// KDC entries (`host[:port]`) of each realm.
    pub realms: HashMap<String, Vec<String>>,
    /// Host or `.domain` to realm mappings, in file order.
    pub domain_realm: Vec<(String, String)>,
}

impl Default for Krb5Config {
    fn default() -> Self {
        return Self {
            default_realm: None,
            default_ccache_name: None,
            ticket_lifetime: Duration::days(1),
            renew_lifetime: None,
            forwardable: false,
            proxiable: false,
            udp_preference_limit: 1,
            dns_lookup_kdc: true,
            realms: HashMap::new(),
            domain_realm: Vec::new(),
        };
    }
}

impl Krb5Config {
    /// Loads the file named by `KRB5_CONFIG`, or the system one. A missing
    /// file gives the default settings.
    pub fn load() -> ProtoResult<Self> {
        let path = env::var(CONFIG_ENVVAR)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        return Self::from_file(&path);
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ProtoResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!("Loading Kerberos configuration {}", path.display());
                return Self::parse(&content);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                let message = format!(
                    "Unable to read configuration '{}'",
                    path.display()
                );
                return Err((message, err).into());
            }
        }
    }

    pub fn parse(content: &str) -> ProtoResult<Self> {
        let mut config = Self::default();
        let mut section = String::new();
        let mut depth = 0;
        let mut current_realm: Option<String> = None;

        for (index, raw_line) in content.lines().enumerate() {
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') || depth != 0 {
                    return Err(syntax_error(index, raw_line));
                }
                section = line[1..line.len() - 1].trim().to_lowercase();
                continue;
            }

            if line == "}" {
                if depth == 0 {
                    return Err(syntax_error(index, raw_line));
                }
                depth -= 1;
                if depth == 0 {
                    current_realm = None;
                }
                continue;
            }

            let (key, value) = split_key_value(line)
                .ok_or_else(|| syntax_error(index, raw_line))?;

            if value == "{" {
                depth += 1;
                if depth == 1 && section == "realms" {
                    config.realms.entry(key.to_string()).or_default();
                    current_realm = Some(key.to_string());
                }
                continue;
            }

            match section.as_str() {
                "libdefaults" if depth == 0 => {
                    config.set_libdefault(key, value, index, raw_line)?
                }
                "realms" if depth == 1 => {
                    if let (Some(realm), "kdc") = (&current_realm, key) {
                        config
                            .realms
                            .entry(realm.clone())
                            .or_default()
                            .push(value.to_string());
                    }
                }
                "domain_realm" if depth == 0 => {
                    config
                        .domain_realm
                        .push((key.to_lowercase(), value.to_string()));
                }
                _ => {}
            }
        }

        if depth != 0 {
            return Err(ProtocolError::Config("unclosed '{' block".into()));
        }

        return Ok(config);
    }

    fn set_libdefault(
        &mut self,
        key: &str,
        value: &str,
        index: usize,
        raw_line: &str,
    ) -> ProtoResult<()> {
        match key {
            "default_realm" => self.default_realm = Some(value.to_string()),
            "default_ccache_name" => {
                self.default_ccache_name = Some(value.to_string())
            }
            "ticket_lifetime" => {
                self.ticket_lifetime = parse_duration(value)
                    .ok_or_else(|| syntax_error(index, raw_line))?
            }
            "renew_lifetime" => {
                self.renew_lifetime = Some(
                    parse_duration(value)
                        .ok_or_else(|| syntax_error(index, raw_line))?,
                )
            }
            "forwardable" => self.forwardable = parse_bool(value),
            "proxiable" => self.proxiable = parse_bool(value),
            "dns_lookup_kdc" => self.dns_lookup_kdc = parse_bool(value),
            "udp_preference_limit" => {
                self.udp_preference_limit = value
                    .parse()
                    .map_err(|_| syntax_error(index, raw_line))?
            }
            _ => {}
        }
        return Ok(());
    }

    /// Cache used when none is given: `KRB5CCNAME`, the configured one or
    /// the per user file in the temporary directory.
    pub fn default_ccache_name(&self) -> String {
        if let Ok(name) = env::var(CCACHE_ENVVAR) {
            if !name.is_empty() {
                return name;
            }
        }

        if let Some(name) = &self.default_ccache_name {
            return expand_uid(name);
        }

        return format!(
            "FILE:{}",
            env::temp_dir().join(user_cache_file()).display()
        );
    }

    /// Realm of a host, from the `domain_realm` mappings (the exact host
    /// first, then its parent domains), else its upper-cased parent domain,
    /// else the default realm.
    pub fn host_realm(&self, hostname: &str) -> Option<String> {
        let host = hostname.trim_end_matches('.').to_lowercase();

        if let Some(realm) = self.mapped_realm(&host) {
            return Some(realm);
        }

        let mut domain = host.as_str();
        while let Some(dot) = domain.find('.') {
            if let Some(realm) = self.mapped_realm(&domain[dot..]) {
                return Some(realm);
            }
            domain = &domain[dot + 1..];
        }

        if let Some(dot) = host.find('.') {
            let parent = &host[dot + 1..];
            if !parent.is_empty() {
                return Some(parent.to_uppercase());
            }
        }

        return self.default_realm.clone();
    }

    fn mapped_realm(&self, key: &str) -> Option<String> {
        return self
            .domain_realm
            .iter()
            .find(|(domain, _)| domain == key)
            .map(|(_, realm)| realm.clone());
    }

    pub fn kdcs(&self, realm: &str) -> &[String] {
        match self.realms.get(realm) {
            Some(kdcs) => kdcs,
            None => &[],
        }
    }
}

fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') || trimmed.starts_with(';') {
        return "";
    }
    return line;
}

fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.splitn(2, '=');
    let key = parts.next()?.trim();
    let value = parts.next()?.trim();
    if key.is_empty() {
        return None;
    }
    return Some((key, value));
}

fn syntax_error(index: usize, line: &str) -> ProtocolError {
    return ProtocolError::Config(format!(
        "syntax error at line {}: '{}'",
        index + 1,
        line.trim()
    ));
}

fn parse_bool(value: &str) -> bool {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => true,
        _ => false,
    }
}

/// Parses durations as `36000`, `10h`, `1d 12h` or `7d`. Durations too
/// large to be represented give `None`.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(seconds) = text.parse::<i64>() {
        return Duration::try_seconds(seconds);
    }

    let mut total = Duration::zero();
    let mut number = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        if c.is_whitespace() {
            continue;
        }

        let amount: i64 = number.parse().ok()?;
        number.clear();
        let part = match c {
            'd' => Duration::try_days(amount),
            'h' => Duration::try_hours(amount),
            'm' => Duration::try_minutes(amount),
            's' => Duration::try_seconds(amount),
            _ => return None,
        }?;
        total = total.checked_add(&part)?;
    }

    if !number.is_empty() {
        return None;
    }
    return Some(total);
}

fn expand_uid(name: &str) -> String {
    match current_uid() {
        Some(uid) => name.replace("%{uid}", &uid.to_string()),
        None => name.to_string(),
    }
}

fn user_cache_file() -> String {
    match current_uid() {
        Some(uid) => format!("krb5cc_{}", uid),
        None => match env::var("USERNAME").or_else(|_| env::var("USER")) {
            Ok(user) => format!("krb5cc_{}", user),
            Err(_) => "krb5cc".to_string(),
        },
    }
}

#[cfg(unix)]
fn current_uid() -> Option<u32> {
    use std::os::unix::fs::MetadataExt;
    return fs::metadata("/proc/self").ok().map(|meta| meta.uid());
}

#[cfg(not(unix))]
fn current_uid() -> Option<u32> {
    return None;
}
