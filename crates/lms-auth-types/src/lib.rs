//! Session token types shared by the LMS crates.
//!
//! Provides token issuance and stateless validation plus the `BearerIdentity` extractor.

pub mod identity;
pub mod token;
