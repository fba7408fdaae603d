pub mod db;
pub mod listing;
