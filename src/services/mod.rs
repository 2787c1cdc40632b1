pub mod auth_services;
pub mod password;
pub mod post_service;
pub mod token_service;
pub mod upload_service;
