use chrono::NaiveDate;
use movetrack_core::db::open_db_in_memory;
use movetrack_core::{
    Interval, ItemFields, ItemRepository, ItemValidationError, SqliteItemRepository, StoreError,
};
use rusqlite::Connection;

#[test]
fn create_then_get_round_trips_fields_and_intervals() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteItemRepository::try_new(&mut conn).unwrap();

    let item_id = repo
        .create_item(
            &fields("Sofa", "Furniture", "Lucia"),
            &[
                interval("Baltimore", "2023-05-01", "2023-08-31"),
                interval("In-Transit", "2023-09-01", "2023-09-02"),
            ],
        )
        .unwrap();

    let record = repo.get_item(item_id).unwrap().unwrap();
    assert_eq!(record.id, item_id);
    assert_eq!(record.name, "Sofa");
    assert_eq!(record.category, "Furniture");
    assert_eq!(record.owner, "Lucia");
    assert_eq!(record.notes, "");
    assert_eq!(record.intervals.len(), 2);
    assert_eq!(record.intervals[0].location, "Baltimore");
    assert_eq!(record.intervals[1].location, "In-Transit");
}

#[test]
fn list_items_returns_records_in_creation_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteItemRepository::try_new(&mut conn).unwrap();

    let first = repo.create_item(&fields("Desk", "Work", "Andy"), &[]).unwrap();
    let second = repo
        .create_item(
            &fields("Mattress", "Bed and Bath", "NA"),
            &[interval("Hawaii", "2023-09-01", "2023-09-03")],
        )
        .unwrap();
    let third = repo.create_item(&fields("Toolbox", "Tools", "Andy"), &[]).unwrap();

    let listed = repo.list_items().unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].id, first);
    assert_eq!(listed[1].id, second);
    assert_eq!(listed[2].id, third);
    assert!(listed[0].intervals.is_empty());
    assert_eq!(listed[1].intervals.len(), 1);
}

#[test]
fn create_item_rejects_blank_name_without_writing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteItemRepository::try_new(&mut conn).unwrap();

    let err = repo.create_item(&fields("   ", "Furniture", ""), &[]).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ItemValidationError::EmptyName)
    ));
    assert!(repo.list_items().unwrap().is_empty());
}

#[test]
fn update_with_interval_list_replaces_wholesale() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteItemRepository::try_new(&mut conn).unwrap();

    let item_id = repo
        .create_item(
            &fields("Bike", "Rec", "Andy"),
            &[
                interval("Baltimore", "2023-05-01", "2023-06-30"),
                interval("Uhaul Container", "2023-07-01", "2023-08-15"),
                interval("In-Transit", "2023-08-16", "2023-08-31"),
            ],
        )
        .unwrap();

    repo.update_item(
        item_id,
        &fields("Bike", "Rec", "Andy"),
        Some(&[interval("Hawaii", "2023-09-01", "2023-09-03")]),
    )
    .unwrap();

    let record = repo.get_item(item_id).unwrap().unwrap();
    assert_eq!(record.intervals.len(), 1);
    assert_eq!(record.intervals[0].location, "Hawaii");
}

#[test]
fn update_without_interval_list_leaves_intervals_untouched() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteItemRepository::try_new(&mut conn).unwrap();

    let item_id = repo
        .create_item(
            &fields("Lamp", "Furniture", "Lucia"),
            &[interval("Sydney", "2023-01-01", "2023-04-30")],
        )
        .unwrap();

    repo.update_item(item_id, &fields("Floor Lamp", "Furniture", "Lucia"), None)
        .unwrap();

    let record = repo.get_item(item_id).unwrap().unwrap();
    assert_eq!(record.name, "Floor Lamp");
    assert_eq!(record.intervals.len(), 1);
    assert_eq!(record.intervals[0].location, "Sydney");
}

#[test]
fn update_missing_item_reports_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteItemRepository::try_new(&mut conn).unwrap();

    let err = repo
        .update_item(4242, &fields("Ghost", "Tools", ""), None)
        .unwrap_err();
    assert!(matches!(err, StoreError::ItemNotFound(4242)));
}

#[test]
fn delete_item_removes_intervals_and_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();

    let item_id = {
        let mut repo = SqliteItemRepository::try_new(&mut conn).unwrap();
        let item_id = repo
            .create_item(
                &fields("Crate", "Kitchen", "NA"),
                &[interval("Uhaul Container", "2023-07-01", "2023-08-15")],
            )
            .unwrap();
        assert!(repo.delete_item(item_id).unwrap());
        assert!(!repo.delete_item(item_id).unwrap());
        assert!(repo.get_item(item_id).unwrap().is_none());
        item_id
    };

    let orphans: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM intervals WHERE item_id = ?1;",
            [item_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn corrupt_stored_date_surfaces_as_invalid_data() {
    let mut conn = open_db_in_memory().unwrap();

    let item_id = {
        let mut repo = SqliteItemRepository::try_new(&mut conn).unwrap();
        repo.create_item(
            &fields("Rug", "Furniture", "Lucia"),
            &[interval("Connecticut", "2023-02-01", "2023-03-01")],
        )
        .unwrap()
    };

    conn.execute(
        "UPDATE intervals SET start_date = 'whenever' WHERE item_id = ?1;",
        [item_id],
    )
    .unwrap();

    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let err = repo.get_item(item_id).unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn repository_refuses_unmigrated_connection() {
    let mut conn = Connection::open_in_memory().unwrap();

    let err = SqliteItemRepository::try_new(&mut conn).unwrap_err();
    assert!(matches!(err, StoreError::UninitializedConnection { .. }));
}

fn fields(name: &str, category: &str, owner: &str) -> ItemFields {
    ItemFields {
        name: name.to_string(),
        category: category.to_string(),
        owner: owner.to_string(),
        notes: String::new(),
    }
}

fn interval(location: &str, start: &str, end: &str) -> Interval {
    Interval::new(location, date(start), date(end)).unwrap()
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}
