use std::sync::LazyLock;

use anyhow::Context as _;

use crate::error::PortalError;

const BCRYPT_COST: u32 = 10;

/// Stand-in hash checked when no account matches, so that case costs the same bcrypt work.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| bcrypt::hash("lms-no-such-account", BCRYPT_COST).unwrap_or_default());

pub fn hash_password(password: &str) -> Result<String, PortalError> {
    let hash = bcrypt::hash(password, BCRYPT_COST).context("hash password")?;
    Ok(hash)
}

/// A malformed stored hash counts as a mismatch rather than an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Verify against `stored`, or burn an equal verification on a dummy hash when there is none.
pub fn check_password(password: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(hash) => verify_password(password, hash),
        None => {
            let _ = verify_password(password, &DUMMY_HASH);
            false
        }
    }
}
