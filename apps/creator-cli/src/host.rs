//! Desktop stand-in for the messaging host.
//!
//! Opens deep links in the system browser and serves the init data taken
//! from the CLI configuration.

use tribute_gateway::{HostCapability, HostError};

pub struct DesktopHost {
    init_data: Option<String>,
}

impl DesktopHost {
    pub fn new(init_data: &str) -> Self {
        let init_data = Some(init_data.trim().to_string()).filter(|d| !d.is_empty());
        Self { init_data }
    }
}

impl HostCapability for DesktopHost {
    fn open_external_link(&self, url: &str) -> Result<(), HostError> {
        tracing::debug!(url, "opening link in system browser");
        open::that(url).map_err(|e| HostError::OpenFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn read_init_data(&self) -> Option<String> {
        self.init_data.clone()
    }

    fn is_available(&self) -> bool {
        true
    }
}
