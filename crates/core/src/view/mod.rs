pub mod projection;
pub mod selector;
pub mod sink;
pub mod view_model;
