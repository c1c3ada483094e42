//! Container naming helpers
//!
//! Random container names for freshly provisioned containers, and
//! container-name extraction from caller-supplied container URLs.

use crate::error::{Result, StageError};
use rand::Rng;
use std::net::IpAddr;
use url::Url;

/// Shortest generated container name (Azure's lower bound)
pub const CONTAINER_NAME_MIN_LEN: usize = 3;

/// Longest generated container name
pub const CONTAINER_NAME_MAX_LEN: usize = 15;

/// Generate a random lowercase container name.
///
/// Length is uniform over `[3, 15]`, characters uniform over `a..=z`.
pub fn generate_container_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(CONTAINER_NAME_MIN_LEN..=CONTAINER_NAME_MAX_LEN);
    (0..len)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

/// Extract the container name from a container URL.
///
/// Accepts `https://<account>.blob.core.windows.net/<container>[?sas]`,
/// IP-style endpoints such as `http://127.0.0.1:10000/<account>/<container>`,
/// and bare container names.
pub fn container_name_from_url(container_url: &str) -> Result<String> {
    let trimmed = container_url.trim();

    let (path, ip_style) = match Url::parse(trimmed) {
        Ok(url) => {
            let ip_style = match url.host_str() {
                Some(host) => host
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .parse::<IpAddr>()
                    .is_ok(),
                None => false,
            };
            (url.path().to_string(), ip_style)
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let path = trimmed.split(['?', '#']).next().unwrap_or_default();
            (path.to_string(), false)
        }
        Err(e) => {
            return Err(StageError::invalid_argument(format!(
                "Invalid container URL '{container_url}': {e}"
            )))
        }
    };

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    if ip_style {
        // account name comes first on IP-style endpoints
        segments.next();
    }

    segments
        .next()
        .map(str::to_string)
        .ok_or_else(|| {
            StageError::invalid_argument(format!(
                "No container name found in '{container_url}'"
            ))
        })
}
