pub mod connection;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::*;
