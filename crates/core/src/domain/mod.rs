pub mod climate;
pub mod input;
pub mod order;
pub mod product;
