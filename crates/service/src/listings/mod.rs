//! Listings module: domain, repository and controller layers.
//!
//! The controller owns the request flow for every listing action; the web
//! layer only translates its `Outcome` into HTTP.

pub mod authorization;
pub mod controller;
pub mod domain;
pub mod repo;
pub mod repository;
pub mod session;

pub use controller::{ListingController, Outcome, View};
