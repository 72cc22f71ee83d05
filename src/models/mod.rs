pub mod doctor;
pub mod enums;
pub mod patient;
pub mod prescription;
pub mod session;

pub use doctor::*;
pub use enums::*;
pub use patient::*;
pub use prescription::*;
pub use session::*;
