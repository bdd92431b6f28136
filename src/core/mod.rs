pub mod config;
pub mod i18n;
pub mod message;
pub mod pipeline;
pub mod rebrand;
pub mod registry;
pub mod store;
