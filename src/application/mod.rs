pub mod cache;
pub mod cleanup;
pub mod feed;
