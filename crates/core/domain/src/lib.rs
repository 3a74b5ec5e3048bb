pub mod credential;
pub mod record;

pub use credential::Credential;
pub use record::{CONFIG_CATEGORY, CONFIG_TYPE, ConfigurationRecord, Content, Metadata};
