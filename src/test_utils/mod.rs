//! Shared test helpers: config builders, modem page fixtures and mocks.

#![cfg(test)]

pub mod mocks;
pub mod pages;
