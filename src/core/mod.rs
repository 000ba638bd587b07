pub mod bank;
pub mod currency;
pub mod deposit;
pub mod schedule;
pub mod settings;
