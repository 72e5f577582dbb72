pub mod auth;
pub mod chat;
pub mod cli;
pub mod core;
pub mod providers;
pub mod storage;
