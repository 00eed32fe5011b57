//! Idempotency key helpers.
//!
//! Each submission carries its own key so a backend can drop a duplicate record when the
//! user re-submits after a response was lost in transit.

use uuid::Uuid;

const SUBMIT_PREFIX: &str = "bfg-feedback-submit-";

pub fn new_submission_key() -> String {
    format!("{SUBMIT_PREFIX}{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_prefixed_and_unique() {
        let a = new_submission_key();
        let b = new_submission_key();
        assert!(a.starts_with(SUBMIT_PREFIX));
        assert_eq!(a.len(), SUBMIT_PREFIX.len() + 32);
        assert_ne!(a, b);
    }
}
