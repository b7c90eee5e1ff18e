pub mod error;
pub mod fetcher;
pub mod parser;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
