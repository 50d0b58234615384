//! IP address redactor covering IPv4 and IPv6 forms.

use regex::Regex;

use super::{compile_pattern, PatternRedactor};
use crate::error::ConfigError;
use crate::types::PiiCategory;

/// IPv4 dotted quads, full-form IPv6, and `::`-compressed IPv6.
const PATTERN: &str = r"\b(?:\d{1,3}\.){3}\d{1,3}\b|\b(?:[0-9A-Fa-f]{1,4}:){7}[0-9A-Fa-f]{1,4}\b|\b(?:[0-9A-Fa-f]{1,4}:){1,7}:(?:[0-9A-Fa-f]{1,4}(?::[0-9A-Fa-f]{1,4}){0,6}\b)?";

pub struct IpAddressRedactor {
    pattern: Regex,
}

impl IpAddressRedactor {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: compile_pattern(&PiiCategory::IpAddress, PATTERN)?,
        })
    }
}

impl PatternRedactor for IpAddressRedactor {
    fn category(&self) -> PiiCategory {
        PiiCategory::IpAddress
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn validate(&self, candidate: &str) -> bool {
        valid_ipv4(candidate) || valid_ipv6(candidate)
    }

    fn max_match_len(&self) -> usize {
        45
    }
}

fn valid_ipv4(candidate: &str) -> bool {
    let parts: Vec<&str> = candidate.split('.').collect();
    parts.len() == 4 && parts.iter().all(|part| part.parse::<u8>().is_ok())
}

fn valid_ipv6(candidate: &str) -> bool {
    if candidate.contains("::") {
        // At most one compression marker
        if candidate.matches("::").count() > 1 {
            return false;
        }
    } else if candidate.split(':').count() != 8 {
        return false;
    }
    candidate
        .split(':')
        .filter(|part| !part.is_empty())
        .all(|part| part.len() <= 4 && part.chars().all(|c| c.is_ascii_hexdigit()))
}
