pub mod config;
pub mod error;
pub mod id;
pub mod message;
pub mod model;
pub mod provider;
pub mod session;
pub mod user;
