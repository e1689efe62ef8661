pub mod live;
pub mod series_builder;
pub mod service;
