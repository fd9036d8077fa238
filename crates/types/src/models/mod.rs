//! Shared domain models used across providers and callers

pub mod token_amount;

pub use token_amount::TokenAmount;
