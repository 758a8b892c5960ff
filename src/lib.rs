//! StudentsNet - Student Networking Platform Backend
//!
//! This crate implements the account security core (bearer-token lifecycle,
//! brute-force defense, session consistency) and the membership payment
//! reconciliation state machine behind the StudentsNet API.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
