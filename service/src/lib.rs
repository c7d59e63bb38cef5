//! Process-level infrastructure shared by the binaries: command line / environment
//! configuration and logger setup.

pub mod config;
pub mod logging;
