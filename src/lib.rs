//! Sequential, rate-limit-aware collection of League of Legends (Riot) and
//! Dota 2 (OpenDota) match records, persisted as JSON for later processing.

pub mod collector;
pub mod config;
pub mod storage;
