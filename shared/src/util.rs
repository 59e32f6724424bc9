/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a new resource id.
///
/// UUIDv7 in simple (dash-free) form: 32 lowercase hex chars whose leading
/// 48 bits are a millisecond timestamp, so ids sort roughly by creation time.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}
