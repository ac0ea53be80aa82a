pub const DEFAULT_PROJECT_LIMIT: i64 = 9;
pub const DEFAULT_USER_LIMIT: i64 = 3;
pub const MAX_LIMIT: i64 = 100;

/// Interpret a raw `limit` query value: missing or non-numeric input falls
/// back to `default`, anything else is clamped to `1..=MAX_LIMIT`.
pub fn resolve_limit(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(default)
        .clamp(1, MAX_LIMIT)
}
