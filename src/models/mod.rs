pub mod appointment;
pub mod doctor;
pub mod patient;

pub use appointment::*;
pub use doctor::*;
pub use patient::*;
