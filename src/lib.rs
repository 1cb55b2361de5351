pub mod archiver;
pub mod codec;
pub mod config;
pub mod domain;
pub mod engine;
pub mod recorder;
pub mod rollback;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;
