pub mod assign;
pub mod backup;
pub mod config;
pub mod day;
pub mod features;
pub mod month;
pub mod roster;
pub mod stats;
pub mod users;
pub mod whatsapp;
