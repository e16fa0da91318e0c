// Handlers module - one submodule per role surface

pub mod admin;
pub mod auth;
pub mod common;
pub mod customer;
pub mod provider;
pub mod staff;
