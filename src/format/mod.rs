/// 표시용 포맷 유틸리티 (스웨덴어 로케일)
// region:    --- Imports
use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone,
    Timelike, Utc,
};

// endregion: --- Imports

const NBSP: char = '\u{a0}';
const MINUS: char = '\u{2212}';

const MONTHS_SV: [&str; 12] = [
    "januari",
    "februari",
    "mars",
    "april",
    "maj",
    "juni",
    "juli",
    "augusti",
    "september",
    "oktober",
    "november",
    "december",
];

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// region:    --- Timestamps
/// 페이지에 첨부된 시각 문자열 해석
/// - 오프셋이 있는 RFC 3339는 그대로
/// - 오프셋 없는 날짜+시각은 로컬 시간대
/// - 날짜만 있으면 UTC 자정
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return resolve_local(&naive, |n| {
                Local
                    .from_local_datetime(n)
                    .map(|dt| dt.with_timezone(&Utc))
            });
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 로컬 시각을 UTC로 변환
/// 서머타임 시작으로 존재하지 않는 시각은 한 시간 뒤로 민다 (`02:30` -> `03:30`).
fn resolve_local<F>(naive: &NaiveDateTime, resolve: F) -> Option<DateTime<Utc>>
where
    F: Fn(&NaiveDateTime) -> LocalResult<DateTime<Utc>>,
{
    match resolve(naive) {
        LocalResult::None => resolve(&(*naive + Duration::hours(1))).earliest(),
        found => found.earliest(),
    }
}
// endregion: --- Timestamps

// region:    --- Numbers
/// 숫자를 가장 짧은 형태로 표시 (`150`, `150.5`)
pub fn format_amount(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    format!("{}", value)
}

/// SEK 통화 표시 (`1 234,50 kr`)
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("{}{}kr", format_amount(amount), NBSP);
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let sign = if amount < 0.0 && cents > 0 {
        MINUS.to_string()
    } else {
        String::new()
    };

    format!("{}{},{:02}{}kr", sign, whole, cents % 100, NBSP)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(NBSP);
        }
        grouped.push(ch);
    }
    grouped
}
// endregion: --- Numbers

// region:    --- Dates
/// 긴 날짜 표시 (`17 oktober 2026 14:05`), 로컬 시간대 기준
pub fn format_date(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|dt| format_local_date(&dt.with_timezone(&Local)))
}

pub fn format_local_date<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    format!(
        "{} {} {} {:02}:{:02}",
        dt.day(),
        MONTHS_SV[dt.month0() as usize],
        dt.year(),
        dt.hour(),
        dt.minute()
    )
}
// endregion: --- Dates

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_render_like_page_numbers() {
        assert_eq!(format_amount(150.0), "150");
        assert_eq!(format_amount(150.5), "150.5");
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(f64::NAN), "NaN");
    }

    #[test]
    fn currency_uses_swedish_grouping() {
        assert_eq!(format_currency(1234.5), "1\u{a0}234,50\u{a0}kr");
        assert_eq!(format_currency(1_000_000.0), "1\u{a0}000\u{a0}000,00\u{a0}kr");
        assert_eq!(format_currency(99.999), "100,00\u{a0}kr");
        assert_eq!(format_currency(-5.0), "\u{2212}5,00\u{a0}kr");
        assert_eq!(format_currency(0.0), "0,00\u{a0}kr");
    }

    #[test]
    fn dates_use_swedish_month_names() {
        assert_eq!(
            format_date("2026-10-17T14:05:00").as_deref(),
            Some("17 oktober 2026 14:05")
        );
        assert_eq!(
            format_date("2024-05-01 09:30").as_deref(),
            Some("1 maj 2024 09:30")
        );
        assert_eq!(format_date("not a date"), None);
    }

    #[test]
    fn timestamps_accept_common_shapes() {
        let utc = parse_timestamp("2026-10-17T12:00:00Z").unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-10-17T12:00:00+00:00");

        let offset = parse_timestamp("2026-10-17T14:00:00+02:00").unwrap();
        assert_eq!(offset, utc);

        let date_only = parse_timestamp("2026-10-17").unwrap();
        assert_eq!(date_only.to_rfc3339(), "2026-10-17T00:00:00+00:00");

        assert!(parse_timestamp("2026-10-17T12:00:00.250").is_some());
        assert!(parse_timestamp("2027-03-28T02:30:00").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("soon").is_none());
    }

    /// 02:00~03:00이 비어 있는 UTC+1 -> UTC+2 전환일
    fn spring_forward(naive: &NaiveDateTime) -> LocalResult<DateTime<Utc>> {
        match naive.hour() {
            2 => LocalResult::None,
            h if h < 2 => LocalResult::Single((*naive - Duration::hours(1)).and_utc()),
            _ => LocalResult::Single((*naive - Duration::hours(2)).and_utc()),
        }
    }

    #[test]
    fn gap_times_move_forward() {
        let naive = |raw: &str| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").unwrap();

        let in_gap = resolve_local(&naive("2027-03-28T02:30:00"), spring_forward).unwrap();
        let after_gap = resolve_local(&naive("2027-03-28T03:30:00"), spring_forward).unwrap();
        assert_eq!(in_gap, after_gap);
        assert_eq!(in_gap.to_rfc3339(), "2027-03-28T01:30:00+00:00");

        let before_gap = resolve_local(&naive("2027-03-28T01:30:00"), spring_forward).unwrap();
        assert_eq!(before_gap.to_rfc3339(), "2027-03-28T00:30:00+00:00");
    }
}
