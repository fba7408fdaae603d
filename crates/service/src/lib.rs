//! Service layer for job listings on top of `models`.
//! - Keeps form handling, validation and authorization out of the web layer.
//! - Talks to storage through the `ListingRepository` trait.

pub mod errors;
pub mod listings;
#[cfg(test)]
pub mod test_support;
