pub mod events;
pub mod pagination;
pub mod request_token;
pub mod series;
