pub mod color;
pub mod jwt;
pub mod password;
pub mod sampling;

pub use color::color_for;
pub use jwt::*;
pub use password::*;
pub use sampling::pick_winners;
