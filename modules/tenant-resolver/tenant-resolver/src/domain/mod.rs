pub mod cache;
pub mod directory;
pub mod error;
pub mod service;

#[cfg(test)]
mod test_support;
