// ==========================================
// 数据导入集成测试
// ==========================================
// 测试目标: CSV → RecordMapper → 仓储/配置 → 模拟
// ==========================================


use algatrack::domain::action_log::ActionType;
use algatrack::domain::types::{BatchStatus, OrderStatus};
use algatrack::importer::ImportKind;
use std::io::Write;
use tempfile::Builder;
use test_helpers::{create_seeded_state, date, write_csv};

fn path_of(file: &tempfile::NamedTempFile) -> String {
    file.path().to_string_lossy().to_string()
}

#[test]
fn test_import_batches_with_rejections() {
    let (_tmp, _db_path, state) = create_seeded_state().unwrap();
    let csv = write_csv(&[
        "Tipo_Alga,Superficie,Fecha_Inicio,Fecha_Cosecha_Estimada,Estado",
        "Gracilaria,\"2,5\",2025-01-10,2025-04-10,ACTIVO",
        "Ulva,-1,2025-01-10,,activo",
        "Pelillo,1,15/02/2025,,cosechado",
        "Gracilaria,1,fecha-mala,,activo",
    ])
    .unwrap();

    let response = state
        .import_api
        .import_file(ImportKind::Batches, &path_of(&csv), "operador")
        .unwrap();
    let summary = &response.summary;

    assert_eq!(summary.total_rows, 4);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.rejected(), 2);
    let rejected_rows: Vec<usize> = summary.rejections.iter().map(|r| r.row_number).collect();
    assert_eq!(rejected_rows, vec![3, 5]);

    let batches = state.farm_api.list_batches().unwrap();
    assert_eq!(batches.len(), 2);
    let gracilaria = batches.iter().find(|b| b.algae_type == "Gracilaria").unwrap();
    assert_eq!(gracilaria.area_hectares, 2.5);
    assert_eq!(gracilaria.estimated_harvest_date, Some(date(2025, 4, 10)));
    assert_eq!(gracilaria.status, BatchStatus::Active);

    let pelillo = batches.iter().find(|b| b.algae_type == "Pelillo").unwrap();
    assert_eq!(pelillo.sowing_date, date(2025, 2, 15));
    assert_eq!(pelillo.status, BatchStatus::Harvested);
    // 未给出收获日期时按藻种估算
    assert!(pelillo.estimated_harvest_date.is_some());
}

#[test]
fn test_import_orders_then_simulate() {
    let (_tmp, _db_path, state) = create_seeded_state().unwrap();
    let batches = write_csv(&[
        "tipo_alga,superficie,fecha_inicio,estado",
        "Gracilaria,1,2025-01-01,cosechado",
    ])
    .unwrap();
    let orders = write_csv(&[
        "cliente,producto,cantidad_ton,fecha_entrega,estado",
        "Acme,Agar,4,2025-10-01,PENDIENTE",
        "Beta,,3,2025-10-05,cancelado",
        "Gamma,,0,2025-10-05,pendiente",
    ])
    .unwrap();

    state
        .import_api
        .import_file(ImportKind::Batches, &path_of(&batches), "operador")
        .unwrap();
    let response = state
        .import_api
        .import_file(ImportKind::Orders, &path_of(&orders), "operador")
        .unwrap();
    assert_eq!(response.summary.imported, 2);
    assert_eq!(response.summary.rejected(), 1);

    let stored = state.farm_api.list_orders().unwrap();
    assert!(stored.iter().any(|o| o.status == OrderStatus::Cancelled));

    // 10 t 供给 - 4 t 承诺 (已取消订单不计)
    let stock = state.simulation_api.preview_stock(date(2025, 10, 15)).unwrap();
    assert_eq!(stock.committed_tons, 4.0);
    assert_eq!(stock.net_available_tons, 6.0);

    let summary = state
        .simulation_api
        .run_simulation(6.0, Some("2025-10-15"), "ventas")
        .unwrap();
    assert_eq!(summary.data.deficit_tons(), 0.0);
}

#[test]
fn test_import_seasons_updates_factors() {
    let (_tmp, db_path, state) = create_seeded_state().unwrap();
    let csv = write_csv(&[
        "nombre_estacion,meses_asociados,factor_biomasa,factor_secado,factor_energia,factor_crecimiento",
        "Primavera,\"9,10,11\",0.5,1,1,1",
        "Rota,\"13\",1,1,1,1",
    ])
    .unwrap();

    let response = state
        .import_api
        .import_file(ImportKind::Seasons, &path_of(&csv), "operador")
        .unwrap();
    assert_eq!(response.summary.imported, 1);
    assert_eq!(response.summary.rejected(), 1);

    let conn = test_helpers::open_test_connection(&db_path).unwrap();
    test_helpers::insert_batch_row(&conn, "Gracilaria", 1.0, "2025-01-01", None, "cosechado")
        .unwrap();

    let summary = state
        .simulation_api
        .run_simulation(1.0, Some("2025-10-15"), "ventas")
        .unwrap();
    assert_eq!(summary.data.projected_stock_tons(), 5.0);
    assert!(summary.data.warnings.is_empty());
}

#[test]
fn test_import_parameters_and_audit() {
    let (_tmp, _db_path, state) = create_seeded_state().unwrap();
    let csv = write_csv(&["clave,valor", "precio_kwh,200", "precio_agua_m3,-5"]).unwrap();

    let response = state
        .import_api
        .import_file(ImportKind::Parameters, &path_of(&csv), "admin")
        .unwrap();
    assert_eq!(response.summary.imported, 1);
    assert!(response.message.contains('1'));

    let value = state
        .config_manager
        .get_parameter_value("precio_kwh")
        .unwrap()
        .unwrap();
    assert_eq!(value.parse::<f64>().unwrap(), 200.0);

    let logs = state.action_log_repo.find_by_actor("admin", 10).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(ActionType::parse(&logs[0].action_type), Some(ActionType::DataImport));
    let payload = logs[0].payload_json.as_ref().unwrap();
    assert_eq!(payload["tabla"], "parametros_sistema");
}

#[test]
fn test_import_errors() {
    let (_tmp, _db_path, state) = create_seeded_state().unwrap();

    let err = state
        .import_api
        .import_file(ImportKind::Batches, "/nonexistent/lotes.csv", "operador")
        .unwrap_err();
    assert_eq!(err.code(), "IMPORT_ERROR");

    let mut txt = Builder::new().suffix(".txt").tempfile().unwrap();
    writeln!(txt, "tipo_alga,superficie").unwrap();
    let err = state
        .import_api
        .import_file(ImportKind::Batches, &path_of(&txt), "operador")
        .unwrap_err();
    assert_eq!(err.code(), "IMPORT_ERROR");

    let csv = write_csv(&["clave,valor"]).unwrap();
    let err = state
        .import_api
        .import_file(ImportKind::Parameters, &path_of(&csv), "  ")
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
}
