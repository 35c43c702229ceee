//! Deep link that asks the messaging host to add the agent to a channel.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

pub const DEFAULT_HOST: &str = "https://t.me";
pub const DEFAULT_AGENT_NAME: &str = "tribute";

/// Admin rights requested for the agent.
pub const DEFAULT_ADMIN_RIGHTS: &[&str] = &[
    "post_messages",
    "edit_messages",
    "delete_messages",
    "invite_users",
];

/// Characters left as-is in path segments and right names.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'-')
    .remove(b'.')
    .remove(b'~');

/// `<host>/<agent>?startgroup=true&admin=<right>+<right>...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    pub host: String,
    pub agent_name: String,
    pub admin_rights: Vec<String>,
}

impl Default for DeepLink {
    fn default() -> Self {
        Self::new(DEFAULT_AGENT_NAME)
    }
}

impl DeepLink {
    /// Link for `agent_name` on the default host with the default rights.
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            agent_name: agent_name.into(),
            admin_rights: DEFAULT_ADMIN_RIGHTS.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_admin_rights<I, S>(mut self, rights: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.admin_rights = rights.into_iter().map(Into::into).collect();
        self
    }

    pub fn url(&self) -> String {
        let agent = self.agent_name.trim_start_matches('@');
        let mut url = format!(
            "{}/{}?startgroup=true",
            self.host.trim_end_matches('/'),
            utf8_percent_encode(agent, COMPONENT)
        );
        if !self.admin_rights.is_empty() {
            let rights: Vec<String> = self
                .admin_rights
                .iter()
                .map(|r| utf8_percent_encode(r, COMPONENT).to_string())
                .collect();
            url.push_str("&admin=");
            url.push_str(&rights.join("+"));
        }
        url
    }
}

impl fmt::Display for DeepLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_link() {
        assert_eq!(
            DeepLink::default().url(),
            "https://t.me/tribute?startgroup=true&admin=post_messages+edit_messages+delete_messages+invite_users"
        );
    }

    #[test]
    fn strips_at_and_trailing_slash() {
        let link = DeepLink::new("@my_bot")
            .with_host("https://t.me/")
            .with_admin_rights(["post_messages"]);
        assert_eq!(
            link.to_string(),
            "https://t.me/my_bot?startgroup=true&admin=post_messages"
        );
    }

    #[test]
    fn encodes_unsafe_characters() {
        let link = DeepLink::new("bad name").with_admin_rights(["a&b", "c=d"]);
        assert_eq!(
            link.url(),
            "https://t.me/bad%20name?startgroup=true&admin=a%26b+c%3Dd"
        );
    }

    #[test]
    fn no_rights_omits_admin() {
        let link = DeepLink::new("bot").with_admin_rights(Vec::<String>::new());
        assert_eq!(link.url(), "https://t.me/bot?startgroup=true");
    }
}
