//! Integration tests

#![cfg(not(slabpool_loom))]

mod concurrent;
mod scenarios;
