use serde::Deserialize;

/// Deployment settings read from Rocket's configuration (`Rocket.toml` or
/// `ROCKET_*` environment variables).
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Shown in page titles, emails and calendar exports.
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Absolute URL of the site without a trailing slash, used to build links
    /// that leave the site (emails, calendar entries).
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

pub const DEFAULT_SITE_NAME: &str = "Conference";

fn default_site_name() -> String {
    DEFAULT_SITE_NAME.to_string()
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl SiteConfig {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Host part of the base URL, used for calendar UIDs.
    pub fn host(&self) -> &str {
        let without_scheme = self
            .base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.base_url);
        without_scheme.split(['/', ':']).next().unwrap_or("localhost")
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            site_name: default_site_name(),
            base_url: default_base_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SiteConfig;

    #[test]
    fn url_and_host() {
        let config = SiteConfig {
            site_name: "PyConES".to_string(),
            base_url: "https://2016.es.pycon.org/".to_string(),
        };
        assert_eq!(
            config.url("/schedule"),
            "https://2016.es.pycon.org/schedule"
        );
        assert_eq!(config.host(), "2016.es.pycon.org");
        assert_eq!(SiteConfig::default().host(), "localhost");
    }
}
