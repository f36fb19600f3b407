use chrono::NaiveDate;
use movetrack_core::{IntervalPayload, ItemForm, OptionLists, SessionService};

#[test]
fn snapshot_embeds_interval_json_with_chart_column_keys() {
    let session = session();
    let snapshot = session
        .submit_item(
            &form(
                "Sofa",
                "Furniture",
                "Lucia",
                vec![
                    payload("Baltimore", "2023-05-01", "2023-08-31"),
                    payload("Hawaii", "2023-09-01", "2023-09-03"),
                ],
            ),
            None,
        )
        .unwrap();

    assert_eq!(snapshot.len(), 1);
    let row = &snapshot[0];
    assert_eq!(row.name, "Sofa");
    assert_eq!(row.owner, "Lucia");

    let embedded: serde_json::Value = serde_json::from_str(&row.intervals).unwrap();
    let entries = embedded.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let mut keys: Vec<&str> = entries[0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(keys, ["End", "Location", "Start"]);
    assert_eq!(entries[1]["Location"], "Hawaii");
    assert_eq!(entries[1]["Start"], "2023-09-01");
    assert_eq!(entries[1]["End"], "2023-09-03");
}

#[test]
fn item_without_intervals_snapshots_as_empty_array_text() {
    let session = session();
    let snapshot = session
        .submit_item(&form("Desk", "Work", "Andy", Vec::new()), None)
        .unwrap();

    assert_eq!(snapshot[0].intervals, "[]");
}

#[test]
fn timeline_flattens_intervals_and_skips_interval_free_items() {
    let session = session();
    session
        .submit_item(
            &form(
                "Bike",
                "Rec",
                "Andy",
                vec![
                    payload("Baltimore", "2023-05-01", "2023-06-30"),
                    payload("In-Transit", "2023-07-01", "2023-07-15"),
                ],
            ),
            None,
        )
        .unwrap();
    session
        .submit_item(&form("Desk", "Work", "Andy", Vec::new()), None)
        .unwrap();

    let timeline = session.timeline().unwrap();
    assert_eq!(timeline.len(), 2);
    assert!(timeline.iter().all(|row| row.name == "Bike"));
    assert_eq!(timeline[0].location, "Baltimore");
    assert_eq!(timeline[0].start, date("2023-05-01"));
    assert_eq!(timeline[1].location, "In-Transit");
    assert_eq!(timeline[1].end, date("2023-07-15"));
}

#[test]
fn overlapping_intervals_persist_and_project() {
    let session = session();
    // An item can sit in overlapping spans while its whereabouts are fuzzy.
    let snapshot = session
        .submit_item(
            &form(
                "Plant Stand",
                "Furniture",
                "Lucia",
                vec![
                    payload("In-Transit", "2023-09-01", "2023-09-10"),
                    payload("Uncertain", "2023-09-05", "2023-09-15"),
                ],
            ),
            None,
        )
        .unwrap();
    assert_eq!(snapshot.len(), 1);

    let timeline = session.timeline().unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0].location, "In-Transit");
    assert_eq!(timeline[1].location, "Uncertain");
    assert!(timeline[1].start < timeline[0].end);
}

#[test]
fn timeline_from_snapshot_matches_direct_store_read() {
    let session = session();
    session
        .submit_item(
            &form(
                "Mattress",
                "Bed and Bath",
                "NA",
                vec![payload("Uhaul Container", "2023-07-01", "2023-08-15")],
            ),
            None,
        )
        .unwrap();
    session
        .submit_item(
            &form(
                "Sofa",
                "Furniture",
                "Lucia",
                vec![payload("Hawaii", "2023-09-01", "2023-09-03")],
            ),
            None,
        )
        .unwrap();

    let snapshot = session.get_snapshot().unwrap();
    assert_eq!(session.get_timeline(&snapshot), session.timeline().unwrap());
}

fn session() -> SessionService {
    SessionService::open_in_memory(OptionLists::default()).unwrap()
}

fn form(name: &str, category: &str, owner: &str, intervals: Vec<IntervalPayload>) -> ItemForm {
    ItemForm {
        name: name.to_string(),
        category: category.to_string(),
        owner: owner.to_string(),
        notes: String::new(),
        intervals,
    }
}

fn payload(location: &str, start: &str, end: &str) -> IntervalPayload {
    IntervalPayload {
        location: location.to_string(),
        start: start.to_string(),
        end: end.to_string(),
    }
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}
