pub mod chat;
pub mod client;
pub mod error;
pub mod post;
pub mod publisher;
