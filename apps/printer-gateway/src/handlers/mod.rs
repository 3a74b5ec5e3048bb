//! Handlers 模块

pub mod configurations;
pub mod printer_configs;
pub mod system;

#[cfg(test)]
mod test_support;

pub use configurations::*;
pub use printer_configs::*;
pub use system::*;
