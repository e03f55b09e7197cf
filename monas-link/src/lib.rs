pub mod application_service;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod port;
pub mod presentation;

#[cfg(test)]
pub(crate) mod test_utils;

pub use domain::*;
pub use port::*;

pub use application_service::key_service::KeyService;
pub use application_service::link_session::LinkSession;
