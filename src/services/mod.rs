// Service module exports

pub mod autostart;
pub mod countdown;
pub mod database;
pub mod fetcher;
pub mod notification;
pub mod runtime;
pub mod scheduler;
pub mod settings;
