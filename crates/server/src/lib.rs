pub mod auth;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod startup;
pub mod state;
pub mod views;

pub use startup::run;
