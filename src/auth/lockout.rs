use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::repo::User;
use crate::config::LockoutConfig;
use crate::error::ApiError;

pub const LOCKED_MESSAGE: &str =
    "Your account is temporarily frozen due to too many unsuccessful attempts, try again later";
pub const JUST_LOCKED_MESSAGE: &str = "Too many unsuccessful attempts, try again later";

/// Where a login attempt stands with respect to the freeze window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeState {
    /// Not frozen.
    Clear,
    /// Freeze window still running; reject without checking the password.
    Locked,
    /// Freeze window elapsed; the account may be thawed and checked.
    Expired,
}

pub fn freeze_state(
    is_frozen: bool,
    last_attempt: Option<OffsetDateTime>,
    now: OffsetDateTime,
    freeze_secs: i64,
) -> FreezeState {
    if !is_frozen {
        return FreezeState::Clear;
    }
    match last_attempt {
        Some(last) if now - last > time::Duration::seconds(freeze_secs) => FreezeState::Expired,
        Some(_) => FreezeState::Locked,
        // Frozen without a timestamp cannot be aged out, so treat it as expired.
        None => FreezeState::Expired,
    }
}

/// Gate a login attempt on the freeze window. When the window has elapsed the
/// freeze is lifted in place (counter reset) and the caller proceeds to the
/// password check; while it is running the attempt is rejected outright.
pub async fn ensure_not_frozen(
    db: &PgPool,
    user: &User,
    cfg: &LockoutConfig,
) -> Result<(), ApiError> {
    match freeze_state(
        user.is_frozen,
        user.last_attempt,
        OffsetDateTime::now_utc(),
        cfg.freeze_secs,
    ) {
        FreezeState::Clear => Ok(()),
        FreezeState::Expired => {
            User::clear_freeze(db, user.id)
                .await
                .map_err(ApiError::Internal)?;
            info!(user_id = %user.id, "freeze window elapsed, counters reset");
            Ok(())
        }
        FreezeState::Locked => {
            warn!(user_id = %user.id, "login attempt on frozen account");
            Err(ApiError::Locked(LOCKED_MESSAGE.into()))
        }
    }
}

/// Record a failed password check. Returns true when this failure froze the
/// account. The increment and the freeze happen in one atomic statement, so
/// concurrent failures never under-count.
pub async fn register_failure(
    db: &PgPool,
    user_id: Uuid,
    cfg: &LockoutConfig,
) -> anyhow::Result<bool> {
    let attempts = User::record_failure(db, user_id, cfg.max_attempts).await?;
    if attempts >= cfg.max_attempts {
        warn!(user_id = %user_id, attempts, "account frozen after repeated failures");
        return Ok(true);
    }
    Ok(false)
}

/// Successful logins reset a nonzero failure counter.
pub async fn reset_attempts_if_any(db: &PgPool, user: &User) -> anyhow::Result<()> {
    if user.failed_attempts > 0 {
        User::reset_attempts(db, user.id).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    const FREEZE: i64 = 300;

    #[test]
    fn active_account_is_clear() {
        let now = OffsetDateTime::now_utc();
        assert_eq!(freeze_state(false, None, now, FREEZE), FreezeState::Clear);
        // A stale timestamp on an unfrozen account changes nothing.
        assert_eq!(
            freeze_state(false, Some(now - Duration::hours(1)), now, FREEZE),
            FreezeState::Clear
        );
    }

    #[test]
    fn frozen_inside_window_stays_locked() {
        let now = OffsetDateTime::now_utc();
        let last = now - Duration::seconds(FREEZE - 1);
        assert_eq!(
            freeze_state(true, Some(last), now, FREEZE),
            FreezeState::Locked
        );
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let now = OffsetDateTime::now_utc();
        // Exactly the freeze duration has not yet elapsed "more than" it.
        let at_boundary = now - Duration::seconds(FREEZE);
        assert_eq!(
            freeze_state(true, Some(at_boundary), now, FREEZE),
            FreezeState::Locked
        );
        let past_boundary = now - Duration::seconds(FREEZE + 1);
        assert_eq!(
            freeze_state(true, Some(past_boundary), now, FREEZE),
            FreezeState::Expired
        );
    }

    #[test]
    fn frozen_without_timestamp_expires() {
        let now = OffsetDateTime::now_utc();
        assert_eq!(freeze_state(true, None, now, FREEZE), FreezeState::Expired);
    }
}
