pub mod coordinate;
pub mod pickup;
pub mod selection;
