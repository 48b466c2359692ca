// Device domain model
use serde::{Deserialize, Serialize};

/// A monitored host as listed by the device directory.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Device {
    #[serde(rename = "hostid", alias = "host_id")]
    pub host_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

impl Device {
    pub fn new(host_id: impl Into<String>) -> Self {
        Self {
            host_id: host_id.into(),
            display_name: None,
            hostname: None,
            ip: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Label shown in the device selector: display name, then hostname, then IP.
    pub fn label(&self) -> &str {
        [&self.display_name, &self.hostname, &self.ip]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.is_empty())
            .unwrap_or(self.host_id.as_str())
    }
}
