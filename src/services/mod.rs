pub mod embed_service;
pub mod login_service;
pub mod report_service;
pub mod token_service;
