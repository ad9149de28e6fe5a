// Library for tests and the rank binary to access modules

pub mod client;
pub mod collector;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod report_repo;
pub mod routes;
pub mod version;
