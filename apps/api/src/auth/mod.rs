pub mod extract;
pub mod jwt;
pub mod permissions;
pub mod token_provider;
