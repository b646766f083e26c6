use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// 过期时间解析器
pub struct TimeParser;

impl TimeParser {
    /// 解析过期时间字符串，支持多种格式：
    /// - RFC3339 格式：2023-10-01T12:00:00Z
    /// - 浏览器 datetime-local：2023-10-01T12:00（按 UTC 处理）
    /// - 日期：2023-10-01（当天 00:00 UTC）
    /// - 相对时间：1d, 2w, 3M, 1y, 1h30m, 2d12h
    pub fn parse_expire_time(input: &str) -> Result<DateTime<Utc>, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err("过期时间不能为空".to_string());
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(dt.with_timezone(&Utc));
        }

        for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
                return Ok(naive.and_utc());
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d")
            && let Some(naive) = date.and_hms_opt(0, 0, 0)
        {
            return Ok(naive.and_utc());
        }

        Self::parse_relative_time(input)
    }

    /// 表单中的可选过期时间，空白视为不过期
    pub fn parse_optional(input: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
        match input.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Self::parse_expire_time(s).map(Some),
        }
    }

    fn parse_relative_time(input: &str) -> Result<DateTime<Utc>, String> {
        let mut total_duration = Duration::zero();
        let mut remaining = input;

        while !remaining.is_empty() {
            let digits_end = remaining
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(remaining.len());
            let (num_str, rest) = remaining.split_at(digits_end);

            if num_str.is_empty() {
                return Err(format!("无效的时间格式: '{}'", input));
            }

            let num: i64 = num_str
                .parse()
                .map_err(|_| format!("无效的数字: '{}'", num_str))?;

            let unit_end = rest
                .find(|c: char| !c.is_alphabetic())
                .unwrap_or(rest.len());
            let (unit_str, rest) = rest.split_at(unit_end);

            if unit_str.is_empty() {
                return Err(format!("缺少时间单位，数字 '{}' 后应跟时间单位", num));
            }

            // "M" 区分大小写表示月，其余单位不区分
            let duration = match unit_str {
                "M" => Self::days_scaled(num, 30),
                _ => match unit_str.to_lowercase().as_str() {
                    "s" | "sec" | "second" | "seconds" => Duration::try_seconds(num),
                    "m" | "min" | "minute" | "minutes" => Duration::try_minutes(num),
                    "h" | "hour" | "hours" => Duration::try_hours(num),
                    "d" | "day" | "days" => Duration::try_days(num),
                    "w" | "week" | "weeks" => Duration::try_weeks(num),
                    "month" | "months" => Self::days_scaled(num, 30),
                    "y" | "year" | "years" => Self::days_scaled(num, 365),
                    _ => return Err(format!("不支持的时间单位: '{}'", unit_str)),
                },
            }
            .ok_or_else(|| format!("时间间隔过大: '{}{}'", num_str, unit_str))?;

            total_duration = total_duration
                .checked_add(&duration)
                .ok_or_else(|| format!("时间间隔过大: '{}'", input))?;
            remaining = rest;
        }

        if total_duration == Duration::zero() {
            return Err("时间间隔不能为零".to_string());
        }

        Utc::now()
            .checked_add_signed(total_duration)
            .ok_or_else(|| "计算的过期时间超出了有效范围".to_string())
    }

    fn days_scaled(num: i64, factor: i64) -> Option<Duration> {
        num.checked_mul(factor).and_then(Duration::try_days)
    }

    /// 格式化剩余时间为人类可读的字符串
    pub fn format_duration_human(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
        let duration = to.signed_duration_since(from);

        if duration.num_seconds() < 0 {
            return "expired".to_string();
        }

        let days = duration.num_days();
        let hours = (duration.num_seconds() % 86400) / 3600;
        let minutes = (duration.num_seconds() % 3600) / 60;

        if days > 0 {
            if hours > 0 {
                format!("{}d {}h", days, hours)
            } else {
                format!("{}d", days)
            }
        } else if hours > 0 {
            if minutes > 0 {
                format!("{}h {}m", hours, minutes)
            } else {
                format!("{}h", hours)
            }
        } else if minutes > 0 {
            format!("{}m", minutes)
        } else {
            format!("{}s", duration.num_seconds())
        }
    }
}
