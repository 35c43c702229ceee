//! Channel handle validation and per-channel status rules.

use std::fmt;

use tribute_protocol::Channel;

use crate::RuleError;

/// Minimum number of characters after the leading `@`.
pub const MIN_NAME_LEN: usize = 3;

/// Maximum length of the whole handle, `@` included.
pub const MAX_HANDLE_LEN: usize = 32;

/// Checks a channel handle such as `@my_channel`.
///
/// The handle must start with `@`, the name after it must be at least
/// [`MIN_NAME_LEN`] characters, the whole handle at most [`MAX_HANDLE_LEN`],
/// and the name may only contain ASCII letters, digits and `_`.
pub fn validate_channel_username(handle: &str) -> Result<(), RuleError> {
    if handle.is_empty() {
        return Err(RuleError::MissingHandle);
    }

    let Some(name) = handle.strip_prefix('@') else {
        return Err(RuleError::MissingAtPrefix);
    };

    let name_len = name.chars().count();
    if name_len < MIN_NAME_LEN {
        return Err(RuleError::HandleTooShort);
    }
    if name_len + 1 > MAX_HANDLE_LEN {
        return Err(RuleError::HandleTooLong);
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RuleError::HandleInvalidCharacters);
    }

    Ok(())
}

/// Returns true if [`validate_channel_username`] accepts the handle.
pub fn is_valid_channel_username(handle: &str) -> bool {
    validate_channel_username(handle).is_ok()
}

/// A validated channel handle.
#[derive(Debug, Clone, Eq)]
pub struct ChannelHandle(String);

impl ChannelHandle {
    /// Validates and wraps a handle.
    pub fn parse(handle: &str) -> Result<Self, RuleError> {
        validate_channel_username(handle)?;
        Ok(Self(handle.to_string()))
    }

    /// Trims whitespace and lowercases raw user input.
    ///
    /// Does not validate; pass the result to [`ChannelHandle::parse`].
    pub fn sanitize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// The full handle, `@` included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The handle without the leading `@`.
    pub fn display_name(&self) -> &str {
        &self.0[1..]
    }
}

impl PartialEq for ChannelHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Verification state of a listed channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStatus {
    pub is_verified: bool,
    pub needs_verification: bool,
    pub can_add_agent: bool,
}

/// True while the backend has not confirmed ownership of the channel.
pub fn needs_verification(channel: &Channel) -> bool {
    !channel.verified
}

/// The agent can only be (re)attached to channels that are not verified yet.
pub fn can_add_agent(channel: &Channel) -> bool {
    !channel.verified
}

pub fn channel_status(channel: &Channel) -> ChannelStatus {
    ChannelStatus {
        is_verified: channel.verified,
        needs_verification: needs_verification(channel),
        can_add_agent: can_add_agent(channel),
    }
}
