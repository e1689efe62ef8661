pub mod cursor;
pub mod repository;
pub mod service;
