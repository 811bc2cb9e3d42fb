pub mod color;
pub mod stage;
pub mod surface;
pub mod text;
