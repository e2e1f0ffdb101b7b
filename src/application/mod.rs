// Application layer - Use cases over the port traits
pub mod dashboard_service;
pub mod ports;
pub mod readings_cache;
pub mod sensor_service;
pub mod series_aligner;
pub mod session;

#[cfg(test)]
pub mod fakes;
