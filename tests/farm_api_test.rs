// ==========================================
// 批次/称重/客户/日历/看板集成测试
// ==========================================
// 测试目标: AppState → FarmApi / ClientApi → SQLite 文件
// ==========================================


use algatrack::app::AppState;
use algatrack::domain::action_log::ActionType;
use algatrack::domain::client::ClientInput;
use algatrack::domain::overview::CalendarEventKind;
use algatrack::domain::types::OrderStatus;
use test_helpers::{create_seeded_state, date, insert_batch_row, open_test_connection};

#[test]
fn test_weighings_survive_reopen() {
    let (_tmp, db_path, state) = create_seeded_state().unwrap();
    let batch = state
        .farm_api
        .register_batch("Gracilaria", 1.5, date(2025, 1, 10), None, "jefe")
        .unwrap();
    state
        .farm_api
        .record_weighing(batch.batch_id, 800.0, date(2025, 3, 1), "jefe")
        .unwrap();
    state
        .farm_api
        .record_weighing(batch.batch_id, 1200.0, date(2025, 3, 8), "campo")
        .unwrap();
    drop(state);

    let reopened = AppState::new(db_path.clone()).unwrap();
    let recent = reopened.farm_api.list_recent_weighings(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].wet_weight_kg, 1200.0);
    assert_eq!(recent[0].dry_weight_kg, 180.0);
    assert_eq!(recent[0].recorded_by, "campo");
    assert_eq!(recent[1].weighing_date, date(2025, 3, 1));

    let conn = open_test_connection(&db_path).unwrap();
    let stored: f64 = conn
        .query_row("SELECT SUM(peso_seco) FROM pesajes", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, 300.0);

    let logs = reopened
        .action_log_repo
        .find_by_action_type(ActionType::HarvestWeighed, 10)
        .unwrap();
    assert_eq!(logs.len(), 2);
}

#[test]
fn test_client_with_orders_is_kept() {
    let (_tmp, _db_path, state) = create_seeded_state().unwrap();
    let acme = state
        .client_api
        .create_client(&ClientInput::new("Acme").with_contact("Rosa"), "admin")
        .unwrap();
    let beta = state
        .client_api
        .create_client(&ClientInput::new("Beta"), "admin")
        .unwrap();
    state
        .farm_api
        .register_order("Acme", None, 2.0, date(2025, 5, 1), "ventas")
        .unwrap();

    let err = state.client_api.delete_client(acme.client_id, "admin").unwrap_err();
    assert_eq!(err.code(), "BUSINESS_RULE_VIOLATION");
    state.client_api.delete_client(beta.client_id, "admin").unwrap();

    let names: Vec<String> = state
        .client_api
        .list_clients()
        .unwrap()
        .into_iter()
        .map(|c| c.company)
        .collect();
    assert_eq!(names, vec!["Acme"]);
}

#[test]
fn test_calendar_and_dashboard_from_stored_rows() {
    let (_tmp, db_path, state) = create_seeded_state().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    insert_batch_row(&conn, "Ulva", 2.0, "2025-01-01", Some("2025-04-01"), "Activo").unwrap();
    insert_batch_row(&conn, "Ulva", 1.0, "2025-01-01", Some("2025-02-01"), "cosechado").unwrap();

    let open = state
        .farm_api
        .register_order("Acme", None, 4.0, date(2025, 3, 20), "ventas")
        .unwrap();
    let done = state
        .farm_api
        .register_order("Beta", None, 6.0, date(2025, 2, 14), "ventas")
        .unwrap();
    state
        .farm_api
        .update_order_status(done.order_id, OrderStatus::Delivered, "ventas")
        .unwrap();

    let events = state.farm_api.calendar_events().unwrap();
    let kinds: Vec<(CalendarEventKind, chrono::NaiveDate)> =
        events.iter().map(|e| (e.kind, e.date)).collect();
    assert_eq!(
        kinds,
        vec![
            (CalendarEventKind::Delivery, date(2025, 2, 14)),
            (CalendarEventKind::Delivery, date(2025, 3, 20)),
            (CalendarEventKind::Harvest, date(2025, 4, 1)),
        ]
    );
    assert_eq!(events[1].source_id, open.order_id);

    let summary = state.farm_api.dashboard_summary(date(2025, 3, 1)).unwrap();
    assert_eq!(summary.active_batches, 1);
    assert_eq!(summary.pending_orders, 1);
    assert_eq!(summary.recent_weighings, 0);
    assert_eq!(summary.delivered_by_month.len(), 1);
    assert_eq!(summary.delivered_by_month[0].month, "2025-02");
    assert_eq!(summary.delivered_by_month[0].delivered_tons, 6.0);
}
