//! Calendar file reading.
//!
//! Thin adapter over the `ical` parser: flattens each event into the
//! fields the importer needs plus the raw property lines, from which the
//! recurrence rule is later extracted by prefix match.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ical::parser::ical::component::IcalEvent;
use ical::IcalParser;
use log::error;

use crate::utils::datetime::{parse_compact_date, parse_compact_datetime};

/// One calendar event, flattened for import.
#[derive(Clone, Debug, Default)]
pub struct CalendarEvent {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
    /// Raw `NAME:value` lines of every property not mapped above.
    pub extra: Vec<String>,
}

impl CalendarEvent {
    /// First raw property line starting with `prefix`.
    pub fn property_line(&self, prefix: &str) -> Option<&str> {
        self.extra
            .iter()
            .map(String::as_str)
            .find(|line| line.starts_with(prefix))
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start.map(|start| start.date())
    }
}

/// Read every event of a calendar file. An unreadable or malformed file is
/// logged and yields no events.
pub fn read_events(path: &Path) -> Vec<CalendarEvent> {
    match try_read(path) {
        Ok(events) => events,
        Err(e) => {
            error!("{e:#}");
            Vec::new()
        }
    }
}

fn try_read(path: &Path) -> Result<Vec<CalendarEvent>> {
    let file =
        File::open(path).with_context(|| format!("cannot open calendar {}", path.display()))?;
    let mut events = Vec::new();
    for calendar in IcalParser::new(BufReader::new(file)) {
        let calendar =
            calendar.with_context(|| format!("malformed calendar {}", path.display()))?;
        events.extend(calendar.events.into_iter().map(convert));
    }
    Ok(events)
}

fn convert(event: IcalEvent) -> CalendarEvent {
    let mut out = CalendarEvent::default();
    for property in event.properties {
        let value = property.value.unwrap_or_default();
        match property.name.as_str() {
            "SUMMARY" => out.name = Some(value),
            "DESCRIPTION" => out.description = Some(value),
            "DTSTART" => {
                let (start, all_day) = parse_stamp(&property.params, &value);
                out.start = start;
                out.all_day = all_day;
            }
            "DTEND" => out.end = parse_stamp(&property.params, &value).0,
            name => out.extra.push(format!("{name}:{value}")),
        }
    }
    out
}

type PropertyParams = Option<Vec<(String, Vec<String>)>>;

/// Parse a `DTSTART`/`DTEND` stamp. A `VALUE=DATE` parameter (or a bare
/// 8-digit value) marks an all-day instant at midnight.
fn parse_stamp(params: &PropertyParams, value: &str) -> (Option<NaiveDateTime>, bool) {
    let is_date = params
        .as_ref()
        .map(|params| {
            params
                .iter()
                .any(|(name, values)| name == "VALUE" && values.iter().any(|v| v == "DATE"))
        })
        .unwrap_or(false)
        || value.len() == 8;

    if is_date {
        let start = parse_compact_date(value)
            .ok()
            .map(|date| date.and_time(NaiveTime::MIN));
        (start, true)
    } else {
        (parse_compact_datetime(value).ok(), false)
    }
}
