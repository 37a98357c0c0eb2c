pub mod key;
pub mod results;
pub mod runner;
