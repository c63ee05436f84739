pub mod roller;
pub mod sample;
