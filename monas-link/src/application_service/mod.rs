pub mod key_service;
pub mod link_session;
