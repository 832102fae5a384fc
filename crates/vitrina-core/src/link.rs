//! # Deep Links
//!
//! Builds the messaging-app URL that carries an order.
//! Opening or displaying the link is the caller's job.

use crate::composer::OrderMessage;
use crate::primitives::{DEEP_LINK_BASE, DEEP_LINK_TEXT_PARAM};
use crate::VitrinaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phone number in international format: digits only, no `+` or separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate a phone number.
    pub fn parse(raw: &str) -> Result<Self, VitrinaError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VitrinaError::InvalidPhoneNumber(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = VitrinaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `https://wa.me/{phone}?text={encoded message}`
#[must_use]
pub fn build_link(phone: &PhoneNumber, message: &OrderMessage) -> String {
    format!(
        "{}{}?{}={}",
        DEEP_LINK_BASE,
        phone.as_str(),
        DEEP_LINK_TEXT_PARAM,
        message.encoded()
    )
}

/// Recover the plain message from a link built by [`build_link`].
///
/// Returns `None` when the link has no text parameter or is not valid UTF-8
/// after decoding.
#[must_use]
pub fn message_from_link(link: &str) -> Option<String> {
    let (_, query) = link.split_once('?')?;
    let prefix = format!("{}=", DEEP_LINK_TEXT_PARAM);
    let value = query
        .split('&')
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))?;
    urlencoding::decode(value).ok().map(|s| s.into_owned())
}

// =============================================================================
// TESTS
// =============================================================================
