pub mod error;
pub mod events;
pub mod local_client;
pub mod policy;
pub mod ports;
pub mod profile;
pub mod repo;
pub mod service;
