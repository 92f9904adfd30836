pub mod handle;
pub mod store;
pub mod token_store;
