// Library exports for Supfile

pub mod cli;
pub mod descriptor;
pub mod error;
pub mod units;
