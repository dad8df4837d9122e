pub mod address;
pub mod cart;
pub mod dealer;
pub mod order;
pub mod product;
