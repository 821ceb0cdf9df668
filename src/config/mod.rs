pub mod catalog;
pub mod settings;

pub use catalog::CatalogConfig;
pub use settings::BotConfig;
