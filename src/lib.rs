#[cfg(not(target_os = "linux"))]
compile_error!("tryolite reads process memory through process_vm_readv and only supports Linux");

pub mod common;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod process;
pub mod scanner;
pub mod session;
pub mod writer;

pub use error::{Error, Result};
