//! Refreshes world-country metadata and exchange rates into a local SQLite
//! store, deriving an estimated GDP for every country.

pub mod api;
pub mod bar_chart;
pub mod config;
pub mod countries;
pub mod db;
pub mod error;
pub mod export;
pub mod gdp;
pub mod models;
pub mod refresh;
