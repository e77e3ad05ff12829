pub mod binance;
pub mod db_init;
pub mod engine;
pub mod expo;
pub mod monitor;
pub mod store;

pub mod alerts_service;
