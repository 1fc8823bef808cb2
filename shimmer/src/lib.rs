mod clock;
pub mod field;
pub mod noise;
pub mod problem;
pub mod raster;
pub mod render;
pub mod settings;
mod shimmer;

pub use clock::Clock;
pub use field::FieldState;
pub use problem::Problem;
pub use settings::{Mode, Settings};
pub use shimmer::Shimmer;
