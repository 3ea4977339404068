use rand::Rng;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Document id placeholder asking the backend to generate the id.
pub const ID_UNIQUE: &str = "unique()";

const ID_PADDING: usize = 7;

/// Generate a client-side unique document id.
///
/// Layout: seconds since the epoch in hex, then milliseconds in 5 hex
/// digits, then 7 random hex digits. Ids sort roughly by creation time.
pub fn unique_id() -> String {
    unique_id_at(OffsetDateTime::now_utc())
}

pub(crate) fn unique_id_at(now: OffsetDateTime) -> String {
    let mut id = format!("{:x}{:05x}", now.unix_timestamp(), now.millisecond());
    let mut rng = rand::thread_rng();
    for _ in 0..ID_PADDING {
        let nibble: u32 = rng.gen_range(0..16);
        if let Some(c) = char::from_digit(nibble, 16) {
            id.push(c);
        }
    }
    id
}

/// Current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    format_rfc3339(OffsetDateTime::now_utc())
}

pub(crate) fn format_rfc3339(at: OffsetDateTime) -> String {
    at.format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
