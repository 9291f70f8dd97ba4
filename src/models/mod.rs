pub mod pitch;
pub mod turf;
pub mod weather;

pub use pitch::*;
pub use turf::*;
pub use weather::*;
