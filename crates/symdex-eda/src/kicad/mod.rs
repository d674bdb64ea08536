pub mod geometry;
pub mod index;
pub mod inherit;
pub mod library;
pub mod scanner;
pub mod symbol;
