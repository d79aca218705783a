pub mod core;
pub mod integration;
pub mod sensor;
pub mod server;
pub mod services;
