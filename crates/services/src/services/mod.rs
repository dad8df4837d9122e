pub mod address;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod database_validator;
pub mod dealer;
pub mod dialog_engine;
pub mod order;
pub mod product;
pub mod slot_parser;
