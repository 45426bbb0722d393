pub mod destination;
pub mod resolution;
pub mod round;
