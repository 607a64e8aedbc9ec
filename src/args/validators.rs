use chrono::Utc;
use krbcache::native::parse_duration;

pub fn is_duration(v: String) -> Result<(), String> {
    parse_duration(&v)
        .and_then(|duration| Utc::now().checked_add_signed(duration))
        .ok_or_else(|| {
            format!(
                "Invalid duration '{}', must be seconds or a value such as 1d 10h 30m",
                v
            )
        })?;

    return Ok(());
}
