pub mod mapping;
pub mod message;
pub mod sharepoint;
