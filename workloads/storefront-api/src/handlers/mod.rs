//! Route handlers, one module per API area.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod orders;
pub mod payments;
