pub mod env;
pub mod limits;
pub mod moderate;
pub mod ping;
