//! Existing-entity lookup for incoming records
//!
//! Matching runs on the raw identity values exactly as received; phone
//! normalization belongs to the payload being stored, never to the
//! lookup key.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::db::professionals::{self, Professional};

/// Find the entity an incoming record refers to, if any
///
/// An email hit wins outright; phone is only consulted when the email is
/// absent, empty, or unknown. No match signals a create.
pub async fn find_match(
    pool: &SqlitePool,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<Option<Professional>> {
    if let Some(email) = email.filter(|value| !value.is_empty()) {
        if let Some(found) = professionals::find_professional_by_email(pool, email).await? {
            return Ok(Some(found));
        }
    }

    if let Some(phone) = phone.filter(|value| !value.is_empty()) {
        if let Some(found) = professionals::find_professional_by_phone(pool, phone).await? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        crate::db::create_professionals_table(&pool)
            .await
            .expect("Failed to create schema");

        pool
    }

    async fn seed(pool: &SqlitePool, full_name: &str, email: Option<&str>, phone: Option<&str>) {
        let mut professional = Professional::new(full_name.to_string());
        professional.email = email.map(String::from);
        professional.phone = phone.map(String::from);
        professionals::insert_professional(pool, &professional)
            .await
            .expect("Failed to insert");
    }

    #[tokio::test]
    async fn test_email_match_wins_over_phone_match() {
        let pool = test_pool().await;
        seed(&pool, "Email Owner", Some("a@x.com"), Some("5551110000")).await;
        seed(&pool, "Phone Owner", None, Some("5552220000")).await;

        let found = find_match(&pool, Some("a@x.com"), Some("5552220000"))
            .await
            .expect("Failed to match")
            .expect("Should match");

        assert_eq!(found.full_name, "Email Owner");
    }

    #[tokio::test]
    async fn test_unknown_email_falls_back_to_phone() {
        let pool = test_pool().await;
        seed(&pool, "Phone Owner", None, Some("5552220000")).await;

        let found = find_match(&pool, Some("nobody@x.com"), Some("5552220000"))
            .await
            .expect("Failed to match")
            .expect("Should match");

        assert_eq!(found.full_name, "Phone Owner");
    }

    #[tokio::test]
    async fn test_phone_lookup_uses_raw_value() {
        let pool = test_pool().await;
        seed(&pool, "Stored Digits", None, Some("5551234567")).await;

        // The stored form is digits-only, so a formatted lookup key misses
        let found = find_match(&pool, None, Some("(555) 123-4567"))
            .await
            .expect("Failed to match");

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_missing_and_empty_values_are_tolerated() {
        let pool = test_pool().await;
        seed(&pool, "Somebody", Some("a@x.com"), None).await;

        assert!(find_match(&pool, None, None).await.expect("Failed to match").is_none());
        assert!(find_match(&pool, Some(""), Some(""))
            .await
            .expect("Failed to match")
            .is_none());
    }
}
