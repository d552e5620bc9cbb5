pub mod browser;
pub mod clip_source;
pub mod token_issuer;
