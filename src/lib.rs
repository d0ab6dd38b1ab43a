// Library for tests to access modules

pub mod config;
pub mod error;
pub mod maintenance;
pub mod models;
pub mod query;
pub mod routes;
pub mod sampler;
pub mod store;
pub mod sysinfo_repo;
pub mod time;
pub mod version;
