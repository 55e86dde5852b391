mod common;

use std::fs;

use chrono::{NaiveDate, NaiveTime};
use common::MockBackend;
use doistkit::ics::calendar::{read_events, CalendarEvent};
use doistkit::ics::IcsImporter;

const CALENDAR: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:1@test\r\n\
SUMMARY:Standup\r\n\
DESCRIPTION:Daily sync\r\n\
DTSTART:20240101T090000Z\r\n\
RRULE:FREQ=WEEKLY;BYDAY=MO,WE\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:2@test\r\n\
SUMMARY:Holiday\r\n\
DTSTART;VALUE=DATE:20240315\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

fn event(name: &str) -> CalendarEvent {
    CalendarEvent {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

#[test]
fn reads_events_with_raw_property_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cal.ics");
    fs::write(&path, CALENDAR).unwrap();

    let events = read_events(&path);
    assert_eq!(events.len(), 2);

    let standup = &events[0];
    assert_eq!(standup.name.as_deref(), Some("Standup"));
    assert_eq!(standup.description.as_deref(), Some("Daily sync"));
    assert!(!standup.all_day);
    assert_eq!(
        standup.start_date(),
        Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    );
    assert_eq!(
        standup.property_line("RRULE"),
        Some("RRULE:FREQ=WEEKLY;BYDAY=MO,WE")
    );

    let holiday = &events[1];
    assert!(holiday.all_day);
    assert_eq!(
        holiday.start,
        Some(
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_time(NaiveTime::MIN)
        )
    );
    assert!(holiday.property_line("RRULE").is_none());
}

#[test]
fn unreadable_calendar_yields_zero_events() {
    let events = read_events(std::path::Path::new("/nonexistent/cal.ics"));
    assert!(events.is_empty());
}

#[test]
fn recurring_event_gets_a_rendered_due_phrase() {
    let backend = MockBackend::new();
    let importer = IcsImporter::new(&backend).unwrap();

    let mut standup = event("Standup");
    standup.start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0);
    standup
        .extra
        .push("RRULE:FREQ=WEEKLY;COUNT=5;BYDAY=MO,WE".to_string());

    let (content, args) = importer.event_to_task(&standup, None, None, &[]).unwrap();
    assert_eq!(content, "Standup");
    assert_eq!(
        args.due_string.as_deref(),
        Some("every mon,wed for 5 weeks starting 2024-01-01")
    );
    assert!(args.due_date.is_none());
    assert!(args.due_datetime.is_none());
    assert_eq!(args.completed, Some(false));
}

#[test]
fn all_day_event_gets_a_date_due() {
    let backend = MockBackend::new();
    let importer = IcsImporter::new(&backend).unwrap();

    let mut holiday = event("Holiday");
    holiday.all_day = true;
    holiday.start = Some(
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_time(NaiveTime::MIN),
    );

    let (_, args) = importer.event_to_task(&holiday, None, None, &[]).unwrap();
    assert_eq!(args.due_date.as_deref(), Some("2024-03-15"));
    assert!(args.due_string.is_none());
    assert!(args.due_datetime.is_none());
}

#[test]
fn timed_event_gets_a_datetime_due() {
    let backend = MockBackend::new();
    let importer = IcsImporter::new(&backend).unwrap();

    let mut meeting = event("Meeting");
    meeting.start = NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(14, 30, 0);

    let (_, args) = importer.event_to_task(&meeting, None, None, &[]).unwrap();
    assert_eq!(args.due_datetime.as_deref(), Some("2024-03-15T14:30:00"));
    assert!(args.due_date.is_none());
}

#[test]
fn malformed_rrule_fails_the_event() {
    let backend = MockBackend::new();
    let importer = IcsImporter::new(&backend).unwrap();

    let mut broken = event("Broken");
    broken.start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(9, 0, 0);
    broken.extra.push("RRULE:FOO=BAR".to_string());

    let err = importer.event_to_task(&broken, None, None, &[]).unwrap_err();
    assert!(err.to_string().contains("unknown parameter 'foo'"), "{err:#}");
}

#[test]
fn import_assigns_project_section_and_label() {
    let backend = MockBackend::new();
    let work = backend.seed_project("🎯 Work");
    backend.seed_section("Meetings", &work.id);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cal.ics");
    fs::write(&path, CALENDAR).unwrap();

    let mut importer = IcsImporter::new(&backend).unwrap();
    let imported = importer
        .import(&path, Some("Work"), Some("Meetings"), Some("calendar"))
        .unwrap();
    assert_eq!(imported, 2);

    let state = backend.state.borrow();
    // the label did not exist and was created once
    assert_eq!(state.labels.len(), 1);
    assert_eq!(state.labels[0].name, "calendar");
    assert_eq!(state.tasks.len(), 2);
    for task in &state.tasks {
        // section wins over project
        assert!(task.section_id.is_some());
        assert!(task.project_id.is_none());
        assert_eq!(task.label_ids, vec![state.labels[0].id.clone()]);
    }
}

#[test]
fn unresolvable_names_leave_tasks_in_the_inbox() {
    let backend = MockBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cal.ics");
    fs::write(&path, CALENDAR).unwrap();

    let mut importer = IcsImporter::new(&backend).unwrap();
    importer.import(&path, Some("Nosuch"), None, None).unwrap();

    let state = backend.state.borrow();
    for task in &state.tasks {
        assert!(task.project_id.is_none());
        assert!(task.section_id.is_none());
    }
}
