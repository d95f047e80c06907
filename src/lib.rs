pub mod arguments;
pub mod config;
pub mod errors; // Structured error handling
pub mod logger;
pub mod run;
pub mod telegram;
pub mod tokens;
pub mod tracking;

#[cfg(test)]
pub(crate) mod testing;
