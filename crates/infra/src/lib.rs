//! Infrastructure layer: persistence, services, seeding, configuration.

pub mod config;
pub mod seed;
pub mod services;
pub mod store;

#[cfg(test)]
mod testing;
