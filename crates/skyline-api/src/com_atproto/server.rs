pub mod create_session;
pub mod refresh_session;
