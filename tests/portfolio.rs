use powerworks::{
    application::{
        portfolio::Portfolio,
        query::{OverlayAction, OverlayRequest},
    },
    domain::{
        filter::{self, FilterState},
        grouping::{FEATURED_LIMIT, ProjectGroups, Tally},
        overlay::{DetailOverlay, OverlayKey, OverlayTab},
        types::{ProjectRecord, ProjectStatus, ResultEnvelope, Sector, Selection, SortKey},
    },
};
use serde_json::{Value, json};

fn record(id: &str, title: &str, status: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "slug": "",
        "sector": "POWER_SECTOR",
        "status": status,
        "client": "Generation Co",
        "role": "EPC Contractor",
        "location": "Dhaka",
        "createdAt": created_at,
    })
}

fn envelope(records: Vec<Value>) -> ResultEnvelope {
    serde_json::from_value(json!({
        "success": true,
        "message": "ok",
        "data": records,
    }))
    .expect("valid envelope")
}

fn records(values: Vec<Value>) -> Vec<ProjectRecord> {
    envelope(values).data
}

fn titles(records: &[&ProjectRecord]) -> Vec<String> {
    records.iter().map(|record| record.title.clone()).collect()
}

fn alpha_and_beta(beta_created: &str) -> Vec<ProjectRecord> {
    let mut alpha = record("a", "Alpha Pipeline", "ONGOING", "2024-01-01");
    alpha["sector"] = json!("OIL_AND_GAS");
    alpha["client"] = json!("X");
    let beta = record("b", "Beta Plant", "COMPLETED", beta_created);
    records(vec![beta, alpha])
}

fn mixed_fixture() -> Vec<ProjectRecord> {
    let mut values = vec![
        record("1", "Ashuganj Power Station", "COMPLETED", "2022-03-01"),
        record("2", "Bibiyana Gas Field", "ONGOING", "2021-06-15"),
        record("3", "Chattogram Terminal", "COMPLETED", "2025-01-20"),
        record("4", "Dhaka Substation", "ONGOING", "2024-09-09"),
        record("5", "Meghnaghat Plant", "ONGOING", "2023-11-30"),
    ];
    values[1]["sector"] = json!("OIL_AND_GAS");
    values[2]["sector"] = json!("OIL_AND_GAS");
    values[2]["location"] = json!("Chattogram");
    values[4]["description"] = json!("Combined cycle terminal upgrade");
    records(values)
}

#[test]
fn default_filter_keeps_every_record() {
    let ordered = filter::initial_order(&mixed_fixture());
    let filtered = filter::apply(&ordered, &FilterState::default());

    assert_eq!(filtered.len(), ordered.len());
    let ids: Vec<&str> = filtered.iter().map(|record| record.id.as_str()).collect();
    let expected: Vec<&str> = ordered.iter().map(|record| record.id.as_str()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn completed_never_precedes_ongoing_under_any_sort() {
    let fixture = mixed_fixture();
    for sort in SortKey::ALL {
        let state = FilterState::default().with_sort(sort);
        let filtered = filter::apply(&fixture, &state);
        let first_completed = filtered
            .iter()
            .position(|record| record.status == ProjectStatus::Completed)
            .unwrap_or(filtered.len());
        assert!(
            filtered[first_completed..]
                .iter()
                .all(|record| record.status == ProjectStatus::Completed),
            "ongoing record after a completed one with sort {sort:?}"
        );
    }
}

#[test]
fn text_search_ignores_description() {
    let fixture = mixed_fixture();

    let state = FilterState::default().with_query("TERMINAL");
    assert_eq!(
        titles(&filter::apply(&fixture, &state)),
        vec!["Chattogram Terminal"]
    );

    let state = FilterState::default().with_query("chattogram");
    assert_eq!(
        titles(&filter::apply(&fixture, &state)),
        vec!["Chattogram Terminal"]
    );

    let state = FilterState::default().with_query("combined cycle");
    assert!(filter::apply(&fixture, &state).is_empty());
}

#[test]
fn sector_and_status_filters_are_idempotent() {
    let fixture = mixed_fixture();
    let state = FilterState::default()
        .with_sector(Selection::Only(Sector::OilAndGas))
        .with_status(Selection::Only(ProjectStatus::Ongoing));

    let once: Vec<ProjectRecord> = filter::apply(&fixture, &state)
        .into_iter()
        .cloned()
        .collect();
    let twice = filter::apply(&once, &state);

    assert_eq!(titles(&twice), vec!["Bibiyana Gas Field"]);
    assert_eq!(twice.len(), once.len());
}

#[test]
fn ongoing_record_leads_regardless_of_dates() {
    for beta_created in ["2023-01-01", "2025-06-01"] {
        let ordered = filter::initial_order(&alpha_and_beta(beta_created));
        let filtered = filter::apply(&ordered, &FilterState::default());
        assert_eq!(titles(&filtered), vec!["Alpha Pipeline", "Beta Plant"]);
    }
}

#[test]
fn query_plant_selects_beta_only() {
    let ordered = filter::initial_order(&alpha_and_beta("2023-01-01"));
    let state = FilterState::default().with_query("plant");
    assert_eq!(titles(&filter::apply(&ordered, &state)), vec!["Beta Plant"]);
}

#[test]
fn grouping_caps_featured_entries_and_keeps_order() {
    let mut values: Vec<Value> = (0..4)
        .map(|i| {
            let mut value = record(
                &format!("f{i}"),
                &format!("Featured {i}"),
                "ONGOING",
                &format!("2024-0{}-01", i + 1),
            );
            value["featured"] = json!(true);
            value
        })
        .collect();
    values.push(record("c", "Closed Out", "COMPLETED", "2025-01-01"));

    let ordered = filter::initial_order(&records(values));
    let filtered = filter::apply(&ordered, &FilterState::default());
    let groups = ProjectGroups::partition(filtered);

    assert_eq!(groups.featured.len(), FEATURED_LIMIT);
    assert_eq!(titles(&groups.featured), vec!["Featured 3", "Featured 2"]);
    assert_eq!(titles(&groups.ongoing), vec!["Featured 1", "Featured 0"]);
    assert_eq!(titles(&groups.completed), vec!["Closed Out"]);
}

#[test]
fn tally_counts_status_and_sector() {
    let fixture = mixed_fixture();
    let tally = Tally::count(&fixture);

    assert_eq!(tally.total, 5);
    assert_eq!(tally.ongoing, 3);
    assert_eq!(tally.completed, 2);
    assert_eq!(tally.sector(Sector::OilAndGas), 2);
    assert_eq!(tally.sector(Sector::PowerSector), 3);
}

#[test]
fn overlay_opens_at_first_image_and_resets_on_reopen() {
    let mut values = vec![
        record("a", "Alpha", "ONGOING", "2024-01-01"),
        record("b", "Beta", "ONGOING", "2024-02-01"),
    ];
    for value in &mut values {
        value["images"] = json!([
            {"id": "1", "url": "https://cdn.example.com/1.jpg"},
            {"id": "2", "url": "https://cdn.example.com/2.jpg"},
            {"id": "3", "url": "https://cdn.example.com/3.jpg"},
        ]);
    }
    let fixture = records(values);

    let mut overlay = DetailOverlay::new();
    overlay.open(&fixture[0], 0);
    assert_eq!(overlay.image_index(), 0);

    overlay.next_image();
    overlay.handle_key(OverlayKey::ArrowRight);
    assert_eq!(overlay.image_index(), 2);

    overlay.open(&fixture[1], 0);
    assert_eq!(overlay.image_index(), 0);
    assert_eq!(overlay.selected_id(), Some("b"));
}

#[test]
fn portfolio_overlay_replays_requested_state() {
    let mut value = record("a", "Alpha Pipeline", "ONGOING", "2024-01-01");
    value["images"] = json!([
        {"id": "1", "url": "https://cdn.example.com/1.jpg"},
        {"id": "2", "url": "https://cdn.example.com/2.jpg"},
    ]);
    let portfolio = Portfolio::from_envelope(&envelope(vec![value]));
    let state = FilterState::default();

    let request = OverlayRequest {
        tab: OverlayTab::Gallery,
        image: 1,
        origin: 300,
        action: Some(OverlayAction::Next),
    };
    let view = portfolio
        .overlay("alpha-pipeline", &state, &request)
        .expect("known record");
    let detail = view.detail.expect("overlay stays open");
    assert_eq!(detail.image_index, 0);
    assert_eq!(detail.active_tab, "gallery");
    assert_eq!(detail.image_position.as_deref(), Some("1 / 2"));

    let request = OverlayRequest {
        action: Some(OverlayAction::Key(OverlayKey::Escape)),
        ..request
    };
    let view = portfolio
        .overlay("alpha-pipeline", &state, &request)
        .expect("known record");
    assert!(!view.is_open());
    assert_eq!(view.restore_scroll, Some(300));
}
