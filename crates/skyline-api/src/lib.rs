//! Lexicon bindings for the RPCs and records the skyline client uses.
//!
//! Module paths follow the NSID of each lexicon: `com.atproto.repo.getRecord`
//! lives at [`com_atproto::repo::get_record`].

pub mod app_bsky;
pub mod com_atproto;
pub mod tools_ozone;
