pub mod compare;
pub mod range;
pub mod select;
