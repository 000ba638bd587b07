pub mod rates;
pub mod store;
