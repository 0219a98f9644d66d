pub mod analysis;
pub mod analytics;
pub mod calculations;
pub mod ledger;
pub mod models;
pub mod profile;
pub mod service;
pub mod storage;
pub mod subscription;
