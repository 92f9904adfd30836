pub mod allocation;
pub mod analysis;
pub mod portfolio;
pub mod risk;
pub mod settings;
pub mod user;
