//! LDBWS cache-aside gateway.
//!
//! Serves live departure and arrival boards as normalized JSON. Requests are
//! validated against a fixed station list, answered from a TTL cache when
//! possible and otherwise fetched from the live-departure-board service
//! (directly, through a REST proxy, or from canned mock data).

pub mod cache;
pub mod config;
pub mod domain;
pub mod gateway;
pub mod ldbws;
pub mod stations;
pub mod web;
