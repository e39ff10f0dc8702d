//! Steam account identifier resolution

use std::sync::Arc;

use crate::{ImportError, PlatformAccounts};

/// Every SteamID64 of an individual account starts with this
const STEAM_ID64_PREFIX: &str = "7656119";
const STEAM_ID64_LEN: usize = 17;

const PROFILE_URL_MARKERS: &[&str] = &["steamcommunity.com/id/", "steamcommunity.com/profiles/"];

/// Parsed form of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountIdentifier {
    /// Already canonical
    SteamId(String),
    /// Needs a lookup
    Vanity(String),
}

/// Check for a canonical SteamID64
pub fn is_steam_id64(value: &str) -> bool {
    value.len() == STEAM_ID64_LEN
        && value.starts_with(STEAM_ID64_PREFIX)
        && value.bytes().all(|b| b.is_ascii_digit())
}

/// Classify a vanity name, profile URL or SteamID64
pub fn parse_identifier(input: &str) -> Result<AccountIdentifier, ImportError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ImportError::IdentityResolution(
            "account identifier is empty".into(),
        ));
    }

    if is_steam_id64(trimmed) {
        return Ok(AccountIdentifier::SteamId(trimmed.to_string()));
    }

    let candidate = match PROFILE_URL_MARKERS
        .iter()
        .find_map(|marker| trimmed.find(marker).map(|pos| &trimmed[pos + marker.len()..]))
    {
        Some(rest) => account_segment(rest),
        None => trimmed,
    };

    if candidate.is_empty() {
        return Err(ImportError::IdentityResolution(format!(
            "no account name in profile URL: {}",
            trimmed
        )));
    }

    if is_steam_id64(candidate) {
        Ok(AccountIdentifier::SteamId(candidate.to_string()))
    } else {
        Ok(AccountIdentifier::Vanity(candidate.to_string()))
    }
}

/// Path segment following the profile marker, ignoring query string and fragment
fn account_segment(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.split('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("")
}

/// Turns user input into a SteamID64
pub struct IdentityResolver {
    accounts: Arc<dyn PlatformAccounts>,
}

impl IdentityResolver {
    pub fn new(accounts: Arc<dyn PlatformAccounts>) -> Self {
        Self { accounts }
    }

    pub async fn resolve(&self, input: &str) -> Result<String, ImportError> {
        match parse_identifier(input)? {
            AccountIdentifier::SteamId(id) => {
                tracing::debug!("Identifier is already a SteamID64: {}", id);
                Ok(id)
            }
            AccountIdentifier::Vanity(vanity) => {
                tracing::debug!("Resolving vanity name {}", vanity);
                let id = self
                    .accounts
                    .resolve_vanity(&vanity)
                    .await
                    .map_err(|e| ImportError::IdentityResolution(e.to_string()))?;

                if !is_steam_id64(&id) {
                    return Err(ImportError::IdentityResolution(format!(
                        "lookup for {} returned a malformed SteamID64: {}",
                        vanity, id
                    )));
                }

                tracing::info!("Resolved {} to {}", vanity, id);
                Ok(id)
            }
        }
    }
}
