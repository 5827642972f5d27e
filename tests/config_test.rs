// ==========================================
// 配置读取与维护集成测试
// ==========================================
// 测试目标: parametros_sistema / configuracion_estacional → 强类型快照
// ==========================================


use algatrack::config::{ConfigError, ConfigManager, SimulationConfigReader};
use algatrack::domain::action_log::ActionType;
use algatrack::domain::season::{RawSeasonRow, FALLBACK_SEASON_NAME};
use algatrack::engine::{SeasonResolver, SimulationError};
use algatrack::EconomicParameters;
use test_helpers::{create_seeded_state, create_test_db, insert_season_row, open_test_connection};

fn season_row(name: &str, months: &str, biomass: f64) -> RawSeasonRow {
    RawSeasonRow {
        id: None,
        season_name: name.to_string(),
        months: months.to_string(),
        biomass_factor: biomass,
        drying_factor: 1.0,
        energy_factor: 1.0,
        growth_factor: 1.0,
        description: None,
    }
}

#[tokio::test]
async fn test_empty_tables_fall_back_to_builtin_defaults() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    let params = manager.get_economic_parameters().await.unwrap();
    assert_eq!(params, EconomicParameters::default());

    let table = manager.get_season_table().await.unwrap();
    assert!(table.is_empty());
    assert_eq!(SeasonResolver::resolve(7, &table).name, FALLBACK_SEASON_NAME);

    assert_eq!(manager.get_yield_tons_per_hectare().await.unwrap(), 10.0);
}

#[tokio::test]
async fn test_missing_price_is_incomplete_but_capacity_defaults() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();
    manager.seed_defaults().unwrap();

    let conn = open_test_connection(&db_path).unwrap();
    conn.execute(
        "DELETE FROM parametros_sistema WHERE clave = 'capacidad_planta_dia'",
        [],
    )
    .unwrap();
    let params = manager.get_economic_parameters().await.unwrap();
    assert_eq!(params.plant_daily_capacity_tons, 2.5);

    conn.execute(
        "DELETE FROM parametros_sistema WHERE clave = 'costo_hh_operario'",
        [],
    )
    .unwrap();
    let err = manager.get_economic_parameters().await.unwrap_err();
    match err {
        ConfigError::Invalid(SimulationError::ConfigurationIncomplete { key, .. }) => {
            assert_eq!(key, "costo_hh_operario");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unparseable_value_is_incomplete() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();
    manager.seed_defaults().unwrap();

    let conn = open_test_connection(&db_path).unwrap();
    conn.execute(
        "UPDATE parametros_sistema SET valor = 'abc' WHERE clave = 'precio_diesel_L'",
        [],
    )
    .unwrap();

    assert!(matches!(
        manager.get_economic_parameters().await,
        Err(ConfigError::Invalid(SimulationError::ConfigurationIncomplete { .. }))
    ));
}

#[tokio::test]
async fn test_malformed_season_rows_are_skipped_with_warning() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();
    manager.seed_defaults().unwrap();

    let conn = open_test_connection(&db_path).unwrap();
    insert_season_row(&conn, "SinMeses", "enero", (1.0, 1.0, 1.0, 1.0)).unwrap();
    insert_season_row(&conn, "FactorCero", "1", (0.0, 1.0, 1.0, 1.0)).unwrap();

    let table = manager.get_season_table().await.unwrap();
    assert_eq!(table.entries.len(), 4);
    assert_eq!(table.warnings.len(), 2);
    assert_eq!(SeasonResolver::resolve(1, &table).name, "Verano");
}

#[tokio::test]
async fn test_yield_override() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();
    manager.seed_defaults().unwrap();

    manager.update_parameter("rendimiento_ton_ha", 12.5).unwrap();
    assert_eq!(manager.get_yield_tons_per_hectare().await.unwrap(), 12.5);
}

#[test]
fn test_seed_defaults_is_idempotent_and_preserves_values() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    let first = manager.seed_defaults().unwrap();
    assert_eq!(first.parameters_inserted, 13);
    assert_eq!(first.seasons_inserted, 4);

    manager.update_parameter("precio_kwh", 175.0).unwrap();
    let second = manager.seed_defaults().unwrap();
    assert_eq!(second.parameters_inserted, 0);
    assert_eq!(second.seasons_inserted, 0);

    let value = manager.get_parameter_value("precio_kwh").unwrap().unwrap();
    assert_eq!(value.parse::<f64>().unwrap(), 175.0);
}

#[test]
fn test_config_api_writes_are_validated_and_audited() {
    let (_tmp, _db_path, state) = create_seeded_state().unwrap();

    state
        .config_api
        .update_parameter("precio_kwh", 180.0, "admin")
        .unwrap();
    let err = state
        .config_api
        .update_parameter("precio_kwh", 0.0, "admin")
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");

    state
        .config_api
        .upsert_season(&season_row("Primavera", "9,10,11", 1.1), "admin")
        .unwrap();
    let err = state
        .config_api
        .upsert_season(&season_row("Rota", "0", 1.0), "admin")
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let seasons = state.config_api.list_seasons().unwrap();
    assert_eq!(seasons.len(), 4);
    let spring = seasons.iter().find(|s| s.season_name == "Primavera").unwrap();
    assert_eq!(spring.biomass_factor, 1.1);

    let logs = state.action_log_repo.find_by_actor("admin", 10).unwrap();
    let types: Vec<Option<ActionType>> = logs
        .iter()
        .map(|l| ActionType::parse(&l.action_type))
        .collect();
    assert_eq!(logs.len(), 2);
    assert!(types.contains(&Some(ActionType::ParameterUpdate)));
    assert!(types.contains(&Some(ActionType::SeasonUpdate)));

    let snapshot = state.config_api.get_config_snapshot().unwrap();
    assert!(snapshot.is_object());
}
