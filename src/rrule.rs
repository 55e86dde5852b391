//! Recurrence-rule translation.
//!
//! Parses the `RRULE` fragment of a calendar event (`KEY=value;...`) into a
//! structured rule and renders the Todoist-style due phrase, e.g.
//! `every 3 days starting 2024-01-01 ending 2024-06-01`. Keys are matched
//! against a fixed allow-list; anything else fails closed.

use std::fmt;

use chrono::NaiveDate;

use crate::utils::datetime::{parse_compact_date, parse_compact_datetime, TODOIST_DATE_FORMAT};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RruleError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("invalid '{key}': {value}")]
    InvalidValue { key: String, value: String },
}

/// Recurrence frequency unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frequency {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl Frequency {
    fn from_ics(value: &str) -> Option<Self> {
        match value {
            "yearly" => Some(Self::Year),
            "monthly" => Some(Self::Month),
            "weekly" => Some(Self::Week),
            "daily" => Some(Self::Day),
            "hourly" => Some(Self::Hour),
            "minutely" => Some(Self::Minute),
            "secondly" => Some(Self::Second),
            _ => None,
        }
    }

    /// Unit word used in rendered phrases.
    pub fn unit(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
        }
    }
}

/// A parsed recurrence rule, anchored to the event's start date.
#[derive(Clone, Debug)]
pub struct RecurrenceRule {
    start: NaiveDate,
    freq: Frequency,
    interval: Option<u32>,
    count: Option<u32>,
    until: Option<NaiveDate>,
    byday: Vec<&'static str>,
}

impl RecurrenceRule {
    /// Parse a rule fragment, optionally prefixed with `RRULE` and other
    /// property parameters up to a `:`. Keys and values are
    /// case-insensitive.
    pub fn parse(start: NaiveDate, text: &str) -> Result<Self, RruleError> {
        let body = match text.split_once(':') {
            Some((_, rest)) => rest,
            None => text,
        };

        let mut freq = None;
        let mut interval = None;
        let mut count = None;
        let mut until = None;
        let mut byday = Vec::new();

        for pair in body.split(';').filter(|pair| !pair.is_empty()) {
            let Some((name, value)) = pair.split_once('=') else {
                return Err(RruleError::InvalidValue {
                    key: pair.to_lowercase(),
                    value: "missing '='".to_string(),
                });
            };
            let name = name.to_lowercase();
            let value = value.to_lowercase();
            let invalid = || RruleError::InvalidValue {
                key: name.clone(),
                value: value.clone(),
            };

            match name.as_str() {
                "freq" => freq = Some(Frequency::from_ics(&value).ok_or_else(invalid)?),
                "interval" => interval = Some(value.parse::<u32>().map_err(|_| invalid())?),
                "count" => count = Some(value.parse::<u32>().map_err(|_| invalid())?),
                "until" => until = Some(parse_until(&value).ok_or_else(invalid)?),
                "byday" => {
                    for code in value.split(',') {
                        byday.push(weekday_code(code).ok_or_else(invalid)?);
                    }
                }
                // Recognized but not rendered; Todoist due phrases have no
                // equivalent for these.
                "bymonth" | "wkst" => {}
                _ => return Err(RruleError::UnknownParameter(name)),
            }
        }

        let freq = freq.ok_or(RruleError::InvalidValue {
            key: "freq".to_string(),
            value: "missing".to_string(),
        })?;

        Ok(Self {
            start,
            freq,
            interval,
            count,
            until,
            byday,
        })
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every")?;
        if let Some(interval) = self.interval {
            write!(f, " {} {}s", interval, self.freq.unit())?;
        } else if !self.byday.is_empty() {
            write!(f, " {}", self.byday.join(","))?;
        } else {
            write!(f, " {}", self.freq.unit())?;
        }
        if let Some(count) = self.count {
            write!(f, " for {} {}s", count, self.freq.unit())?;
        }
        write!(f, " starting {}", self.start.format(TODOIST_DATE_FORMAT))?;
        if let Some(until) = self.until {
            write!(f, " ending {}", until.format(TODOIST_DATE_FORMAT))?;
        }
        Ok(())
    }
}

/// `UNTIL` accepts a compact date or date-time stamp.
fn parse_until(value: &str) -> Option<NaiveDate> {
    parse_compact_date(value)
        .ok()
        .or_else(|| parse_compact_datetime(value).ok().map(|dt| dt.date()))
}

fn weekday_code(code: &str) -> Option<&'static str> {
    match code {
        "mo" => Some("mon"),
        "tu" => Some("tue"),
        "we" => Some("wed"),
        "th" => Some("thu"),
        "fr" => Some("fri"),
        "sa" => Some("sat"),
        "su" => Some("sun"),
        _ => None,
    }
}
