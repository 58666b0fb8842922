use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Which wall clock a ticket number is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketClock {
    #[default]
    Utc,
    Local,
}

/// `YYYYMMDDHHmm` of the received timestamp, or an empty string when the
/// message has no (parseable) timestamp.
pub fn ticket_number(received: Option<&str>, clock: TicketClock) -> String {
    let Some(raw) = received.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };
    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts,
        Err(e) => {
            log::warn!("unparseable receivedDateTime {raw:?}: {e}");
            return String::new();
        }
    };
    match clock {
        TicketClock::Utc => stamp(&parsed.with_timezone(&Utc)),
        TicketClock::Local => stamp(&parsed.with_timezone(&Local)),
    }
}

fn stamp<T: Datelike + Timelike>(ts: &T) -> String {
    if !(0..=9999).contains(&ts.year()) {
        log::warn!("receivedDateTime year {} does not fit a ticket number", ts.year());
        return String::new();
    }
    format!(
        "{:04}{:02}{:02}{:02}{:02}",
        ts.year(),
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute()
    )
}
