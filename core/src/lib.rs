pub mod calc;
pub mod db;
pub mod models;
pub mod service;
pub mod store;
