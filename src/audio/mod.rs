//! File I/O for the command-line driver.

pub mod decode;
pub mod encode;
