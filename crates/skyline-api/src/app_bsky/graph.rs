pub mod block;
pub mod follow;
