//! Account domain - registered users and their security-relevant state.

mod account;

pub use account::{validate_contact, Account, AccountRole};
