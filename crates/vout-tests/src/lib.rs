//! Integration test crate for Vout.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It drives the overlay the way a decoder and a render surface would.

#[cfg(test)]
mod scenarios;

#[cfg(test)]
mod binding;

#[cfg(test)]
mod concurrency;
