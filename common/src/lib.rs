pub mod access;
pub mod address;
pub mod amount;
pub mod events;
pub mod time;

pub mod token;

pub mod sale;

pub mod call;
pub mod config;
