use chrono::{DateTime, SubsecRound, Utc};

/// Current instant truncated to the store's millisecond precision, so that
/// records read back from MySQL compare equal to the ones that were written.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
