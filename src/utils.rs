use chrono::{DateTime, FixedOffset, TimeZone};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

// Characters left untouched by a browser's encodeURIComponent.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Brasília time, used when no offset is configured.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

/// Formats an amount as `R$ 1234,50`: two decimals, comma separator and no
/// thousands grouping. Exact halves round away from zero.
pub fn format_currency(value: f64) -> String {
    // -0.0 prints as 0,00.
    let value = if value == 0.0 { 0.0 } else { value };
    let value = if is_cent_tie(value) {
        (value * 100.0).round() / 100.0
    } else {
        value
    };

    format!("R$ {}", format!("{:.2}", value).replace('.', ","))
}

// An odd number of eighths sits exactly halfway between two cents, and its
// product by 100 is exact.
fn is_cent_tie(value: f64) -> bool {
    let eighths = value * 8.0;
    eighths.fract() == 0.0 && (eighths % 2.0).abs() == 1.0
}

/// Formats a timestamp as `dd/mm/yyyy` in the given local offset.
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, offset: &FixedOffset) -> String {
    date.with_timezone(offset).format("%d/%m/%Y").to_string()
}

pub fn utc_offset(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| {
        log::warn!("Invalid UTC offset of {} minutes, falling back to Brasília time.", minutes);
        brasilia_offset()
    })
}

pub fn brasilia_offset() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).expect("UTC-3 is a valid offset.")
}

pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}
