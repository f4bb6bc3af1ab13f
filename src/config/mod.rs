//! Configuration module

mod site;

pub use site::ConfigError;
pub use site::SiteConfig;
pub use site::PAGE_NUMBER_PLACEHOLDER;
