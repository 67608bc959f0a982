use crate::model::staff::StaffRole;

/// How many suffixes registration tries before giving up on an id.
pub const MAX_ID_ATTEMPTS: u64 = 5;

/// `{PREFIX}-{6 digits}` from the role and a millisecond timestamp.
///
/// `attempt` shifts the suffix so a caller can step past an id that storage rejected.
pub fn generate_staff_id(role: StaffRole, timestamp_millis: i64, attempt: u64) -> String {
    let suffix = (timestamp_millis.unsigned_abs() + attempt) % 1_000_000;
    format!("{}-{:06}", role.id_prefix(), suffix)
}
