/**
 * One-Time Verification Codes
 *
 * This module implements the verification service that gates registration,
 * password reset and email change behind a short-lived numeric code sent to
 * the target address.
 *
 * # Lifecycle
 *
 * A pending verification is created (or overwritten) by `issue_code`,
 * mutated only by the attempt decrement on a wrong guess, and deleted on
 * success, on expiry detection, or on attempts-exhaustion detection -
 * whichever happens first. At most one pending record exists per
 * normalized email; the table key enforces this and re-issuing is a plain
 * upsert.
 *
 * # Brute-force bound
 *
 * A 6-digit code gives 1,000,000 possibilities; the 5-minute expiry and
 * the 3-attempt cap bound the search space per issuance. A wrong guess
 * that spends the last attempt still reports the mismatch (with 0 left);
 * exhaustion is detected and the record consumed on the following check,
 * so a correct code after three wrong guesses fails with
 * `AttemptsExhausted` rather than succeeding.
 *
 * # Concurrency
 *
 * The attempt decrement is a single conditional UPDATE
 * (`... SET attempts = attempts - 1 WHERE email = $1 AND attempts > 0`),
 * so two simultaneous wrong guesses cannot drive the counter negative or
 * both observe the same remaining count. The decision logic itself is the
 * pure `evaluate` function over a fetched record and the current time,
 * which keeps the state machine unit-testable without a database.
 */

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;

/// Codes expire this many minutes after issuance
pub const CODE_TTL_MINUTES: i64 = 5;

/// Wrong guesses allowed per issued code
pub const MAX_ATTEMPTS: i32 = 3;

/// A pending verification record
///
/// One row per in-flight email action. `user_id` is set for the
/// authenticated email-change flow and absent for registration and
/// forgot-password, where no account is tied to the address yet.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PendingVerification {
    /// Normalized target address (unique key)
    pub email: String,
    /// 6-digit numeric code
    pub code: String,
    /// Wrong guesses remaining
    pub attempts: i32,
    /// Absolute expiry timestamp
    pub expires_at: DateTime<Utc>,
    /// Owning account, for email-change only
    pub user_id: Option<Uuid>,
    /// Issuance timestamp
    pub created_at: DateTime<Utc>,
}

/// Verification failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// No pending record exists for the address
    NotFound,

    /// The code expired before it was checked
    Expired,

    /// All attempts were spent before this check
    AttemptsExhausted,

    /// Wrong code; carries the attempts remaining after the decrement
    CodeMismatch { attempts_left: i32 },
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("No verification request found"),
            Self::Expired => f.write_str("Code expired"),
            Self::AttemptsExhausted => f.write_str("No attempts left"),
            Self::CodeMismatch { attempts_left } => {
                let plural = if *attempts_left == 1 { "" } else { "s" };
                write!(f, "Invalid code. {attempts_left} attempt{plural} left")
            }
        }
    }
}

/// What the store must do with the record after a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    /// Leave the record untouched
    Keep,
    /// Delete the record
    Consume,
    /// Atomically decrement the attempt counter
    Decrement,
}

/// Outcome of evaluating one check against a fetched record
#[derive(Debug)]
pub struct Verdict {
    pub outcome: Result<(), VerifyError>,
    pub action: StoreAction,
}

/// Generate a uniformly random 6-digit code
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Decide the outcome of a check without touching the store
///
/// Checks run in a fixed order: existence, expiry, exhaustion, match.
/// Expiry and exhaustion consume the record even though they fail; a
/// mismatch asks the store for an atomic decrement (the verdict's
/// `attempts_left` is the expected value, the store's conditional update
/// is authoritative under concurrent checks).
pub fn evaluate(
    pending: Option<&PendingVerification>,
    submitted: &str,
    now: DateTime<Utc>,
) -> Verdict {
    let Some(pending) = pending else {
        return Verdict {
            outcome: Err(VerifyError::NotFound),
            action: StoreAction::Keep,
        };
    };

    if now > pending.expires_at {
        return Verdict {
            outcome: Err(VerifyError::Expired),
            action: StoreAction::Consume,
        };
    }

    if pending.attempts <= 0 {
        return Verdict {
            outcome: Err(VerifyError::AttemptsExhausted),
            action: StoreAction::Consume,
        };
    }

    if pending.code != submitted.trim() {
        return Verdict {
            outcome: Err(VerifyError::CodeMismatch {
                attempts_left: pending.attempts - 1,
            }),
            action: StoreAction::Decrement,
        };
    }

    Verdict {
        outcome: Ok(()),
        action: StoreAction::Consume,
    }
}

/// Issue a code for an email address
///
/// Generates a fresh code, resets expiry and attempts, and upserts the
/// pending record. Any previously issued code for the address stops
/// matching from this point on.
///
/// # Returns
/// The generated code, for dispatch to the notification channel.
pub async fn issue_code(
    pool: &PgPool,
    email: &str,
    user_id: Option<Uuid>,
) -> Result<String, sqlx::Error> {
    let code = generate_code();
    let expires_at = Utc::now() + Duration::minutes(CODE_TTL_MINUTES);

    sqlx::query(
        r#"
        INSERT INTO pending_verifications (email, code, attempts, expires_at, user_id)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email)
        DO UPDATE SET code = $2, attempts = $3, expires_at = $4, user_id = $5, created_at = now()
        "#,
    )
    .bind(email)
    .bind(&code)
    .bind(MAX_ATTEMPTS)
    .bind(expires_at)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(code)
}

/// Issue an email-change code for an authenticated user
///
/// Removes any pending record already tied to the user (they may have
/// requested a change to a different address before), then issues a code
/// bound to both the new address and the user id.
pub async fn issue_change_code(
    pool: &PgPool,
    user_id: Uuid,
    new_email: &str,
) -> Result<String, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM pending_verifications WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let code = generate_code();
    let expires_at = Utc::now() + Duration::minutes(CODE_TTL_MINUTES);

    sqlx::query(
        r#"
        INSERT INTO pending_verifications (email, code, attempts, expires_at, user_id)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email)
        DO UPDATE SET code = $2, attempts = $3, expires_at = $4, user_id = $5, created_at = now()
        "#,
    )
    .bind(new_email)
    .bind(&code)
    .bind(MAX_ATTEMPTS)
    .bind(expires_at)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(code)
}

/// Fetch the pending record for an address
pub async fn fetch_pending(
    pool: &PgPool,
    email: &str,
) -> Result<Option<PendingVerification>, sqlx::Error> {
    sqlx::query_as::<_, PendingVerification>(
        "SELECT email, code, attempts, expires_at, user_id, created_at
         FROM pending_verifications WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Fetch the pending record tied to a user (email-change flow)
pub async fn fetch_pending_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<PendingVerification>, sqlx::Error> {
    sqlx::query_as::<_, PendingVerification>(
        "SELECT email, code, attempts, expires_at, user_id, created_at
         FROM pending_verifications WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Whether a live pending record exists for an address
pub async fn has_pending(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    Ok(fetch_pending(pool, email).await?.is_some())
}

/// Delete the pending record for an address
async fn delete_pending(pool: &PgPool, email: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM pending_verifications WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await?;
    Ok(())
}

/// Atomically spend one attempt
///
/// Returns the attempts remaining after the decrement, or `None` when the
/// counter was already at zero (lost a race to a concurrent check).
async fn decrement_attempts(pool: &PgPool, email: &str) -> Result<Option<i32>, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as(
        "UPDATE pending_verifications SET attempts = attempts - 1
         WHERE email = $1 AND attempts > 0
         RETURNING attempts",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(attempts,)| attempts))
}

/// Apply a verdict to the store
async fn apply(
    pool: &PgPool,
    pending: &PendingVerification,
    submitted: &str,
) -> Result<(), ApiError> {
    let verdict = evaluate(Some(pending), submitted, Utc::now());

    match verdict.action {
        StoreAction::Keep => verdict.outcome.map_err(ApiError::from),
        StoreAction::Consume => {
            delete_pending(pool, &pending.email).await?;
            verdict.outcome.map_err(ApiError::from)
        }
        StoreAction::Decrement => match decrement_attempts(pool, &pending.email).await? {
            Some(attempts_left) => Err(VerifyError::CodeMismatch { attempts_left }.into()),
            None => {
                delete_pending(pool, &pending.email).await?;
                Err(VerifyError::AttemptsExhausted.into())
            }
        },
    }
}

/// Check a submitted code against the pending record for an address
///
/// Success consumes the record; a second check with the same code reports
/// `NotFound`.
pub async fn check_code(pool: &PgPool, email: &str, submitted: &str) -> Result<(), ApiError> {
    match fetch_pending(pool, email).await? {
        Some(pending) => apply(pool, &pending, submitted).await,
        None => Err(VerifyError::NotFound.into()),
    }
}

/// Check a submitted code against the pending record tied to a user
///
/// Used by the authenticated email-change confirmation, where the client
/// submits only the code. On success returns the verified new address.
pub async fn check_code_for_user(
    pool: &PgPool,
    user_id: Uuid,
    submitted: &str,
) -> Result<String, ApiError> {
    match fetch_pending_for_user(pool, user_id).await? {
        Some(pending) => {
            apply(pool, &pending, submitted).await?;
            Ok(pending.email)
        }
        None => Err(VerifyError::NotFound.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(code: &str, attempts: i32, expires_at: DateTime<Utc>) -> PendingVerification {
        PendingVerification {
            email: "a@b.com".to_string(),
            code: code.to_string(),
            attempts,
            expires_at,
            user_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert!(code.parse::<u32>().unwrap() >= 100_000);
        }
    }

    #[test]
    fn test_evaluate_missing_record() {
        let verdict = evaluate(None, "123456", Utc::now());
        assert_eq!(verdict.outcome, Err(VerifyError::NotFound));
        assert_eq!(verdict.action, StoreAction::Keep);
    }

    #[test]
    fn test_evaluate_expired_consumes() {
        let now = Utc::now();
        let pending = record("123456", 3, now - Duration::seconds(1));
        // Expired even with the correct code
        let verdict = evaluate(Some(&pending), "123456", now);
        assert_eq!(verdict.outcome, Err(VerifyError::Expired));
        assert_eq!(verdict.action, StoreAction::Consume);
    }

    #[test]
    fn test_evaluate_exhausted_consumes() {
        let now = Utc::now();
        let pending = record("123456", 0, now + Duration::minutes(5));
        let verdict = evaluate(Some(&pending), "123456", now);
        assert_eq!(verdict.outcome, Err(VerifyError::AttemptsExhausted));
        assert_eq!(verdict.action, StoreAction::Consume);
    }

    #[test]
    fn test_evaluate_mismatch_decrements() {
        let now = Utc::now();
        let pending = record("123456", 3, now + Duration::minutes(5));
        let verdict = evaluate(Some(&pending), "000000", now);
        assert_eq!(
            verdict.outcome,
            Err(VerifyError::CodeMismatch { attempts_left: 2 })
        );
        assert_eq!(verdict.action, StoreAction::Decrement);
    }

    #[test]
    fn test_evaluate_match_consumes() {
        let now = Utc::now();
        let pending = record("123456", 1, now + Duration::minutes(5));
        let verdict = evaluate(Some(&pending), " 123456 ", now);
        assert_eq!(verdict.outcome, Ok(()));
        assert_eq!(verdict.action, StoreAction::Consume);
    }

    #[test]
    fn test_mismatch_message_pluralization() {
        assert_eq!(
            VerifyError::CodeMismatch { attempts_left: 2 }.to_string(),
            "Invalid code. 2 attempts left"
        );
        assert_eq!(
            VerifyError::CodeMismatch { attempts_left: 1 }.to_string(),
            "Invalid code. 1 attempt left"
        );
        assert_eq!(
            VerifyError::CodeMismatch { attempts_left: 0 }.to_string(),
            "Invalid code. 0 attempts left"
        );
    }

    /// In-memory mirror of the store semantics (upsert, conditional
    /// decrement, delete) used to walk the full state machine without a
    /// database. The SQL side is covered by the ignored integration tests.
    struct MemStore {
        records: HashMap<String, PendingVerification>,
    }

    impl MemStore {
        fn new() -> Self {
            Self {
                records: HashMap::new(),
            }
        }

        fn issue(&mut self, email: &str, code: &str, now: DateTime<Utc>) {
            self.records.insert(
                email.to_string(),
                PendingVerification {
                    email: email.to_string(),
                    code: code.to_string(),
                    attempts: MAX_ATTEMPTS,
                    expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
                    user_id: None,
                    created_at: now,
                },
            );
        }

        fn check(&mut self, email: &str, submitted: &str, now: DateTime<Utc>) -> Result<(), VerifyError> {
            let verdict = evaluate(self.records.get(email), submitted, now);
            match verdict.action {
                StoreAction::Keep => {}
                StoreAction::Consume => {
                    self.records.remove(email);
                }
                StoreAction::Decrement => {
                    // Mirrors the conditional UPDATE
                    if let Some(pending) = self.records.get_mut(email) {
                        if pending.attempts > 0 {
                            pending.attempts -= 1;
                        }
                    }
                }
            }
            verdict.outcome
        }
    }

    #[test]
    fn test_reissue_invalidates_previous_code() {
        let now = Utc::now();
        let mut store = MemStore::new();
        store.issue("a@b.com", "111111", now);
        store.issue("a@b.com", "222222", now);

        // The first code no longer matches
        assert_eq!(
            store.check("a@b.com", "111111", now),
            Err(VerifyError::CodeMismatch { attempts_left: 2 })
        );
        // The second one does
        assert_eq!(store.check("a@b.com", "222222", now), Ok(()));
    }

    #[test]
    fn test_success_is_single_use() {
        let now = Utc::now();
        let mut store = MemStore::new();
        store.issue("a@b.com", "123456", now);

        assert_eq!(store.check("a@b.com", "123456", now), Ok(()));
        assert_eq!(
            store.check("a@b.com", "123456", now),
            Err(VerifyError::NotFound)
        );
    }

    #[test]
    fn test_three_wrong_guesses_then_exhausted() {
        let now = Utc::now();
        let mut store = MemStore::new();
        store.issue("a@b.com", "123456", now);

        assert_eq!(
            store.check("a@b.com", "000000", now),
            Err(VerifyError::CodeMismatch { attempts_left: 2 })
        );
        assert_eq!(
            store.check("a@b.com", "000001", now),
            Err(VerifyError::CodeMismatch { attempts_left: 1 })
        );
        assert_eq!(
            store.check("a@b.com", "000002", now),
            Err(VerifyError::CodeMismatch { attempts_left: 0 })
        );
        // The 4th attempt fails even with the correct code
        assert_eq!(
            store.check("a@b.com", "123456", now),
            Err(VerifyError::AttemptsExhausted)
        );
        // Exhaustion consumed the record
        assert_eq!(
            store.check("a@b.com", "123456", now),
            Err(VerifyError::NotFound)
        );
    }

    #[test]
    fn test_expired_code_fails_regardless_of_correctness() {
        let now = Utc::now();
        let mut store = MemStore::new();
        store.issue("a@b.com", "123456", now);

        let later = now + Duration::minutes(CODE_TTL_MINUTES) + Duration::seconds(1);
        assert_eq!(store.check("a@b.com", "123456", later), Err(VerifyError::Expired));
        // Expiry detection consumed the record
        assert_eq!(
            store.check("a@b.com", "123456", later),
            Err(VerifyError::NotFound)
        );
    }

    #[test]
    fn test_mismatch_then_success_then_not_found() {
        // Scenario from the brute-force bound: one wrong guess, then the
        // correct code, then the correct code again.
        let now = Utc::now();
        let mut store = MemStore::new();
        store.issue("a@b.com", "123456", now);

        assert_eq!(
            store.check("a@b.com", "000000", now),
            Err(VerifyError::CodeMismatch { attempts_left: 2 })
        );
        assert_eq!(store.check("a@b.com", "123456", now), Ok(()));
        assert_eq!(
            store.check("a@b.com", "123456", now),
            Err(VerifyError::NotFound)
        );
    }
}
