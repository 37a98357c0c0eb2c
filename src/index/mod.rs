pub mod inverted;
pub mod concurrent;
