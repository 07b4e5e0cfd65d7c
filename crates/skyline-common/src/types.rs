/// Record collections and the `$type` tag
pub mod collection;
/// DID document representation
pub mod did_doc;
/// Access/refresh token payload inspection
pub mod jwt;
