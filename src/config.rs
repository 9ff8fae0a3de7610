use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub admin: AdminConfig,
}

/// Branding for the staff console, passed explicitly to the admin router
/// instead of living in mutable global state.
#[derive(Clone, Debug)]
pub struct AdminConfig {
    pub site_header: String,
    pub site_title: String,
    pub index_title: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            site_header: "Smile Dental Clinic".to_string(),
            site_title: "Clinic control panel".to_string(),
            index_title: "Statistics and management".to_string(),
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Self {
        let defaults = AdminConfig::default();
        Self {
            site_header: env::var("ADMIN_SITE_HEADER").unwrap_or(defaults.site_header),
            site_title: env::var("ADMIN_SITE_TITLE").unwrap_or(defaults.site_title),
            index_title: env::var("ADMIN_INDEX_TITLE").unwrap_or(defaults.index_title),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        Ok(Self {
            database_url,
            bind_addr,
            admin: AdminConfig::from_env(),
        })
    }
}
