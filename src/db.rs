// ==========================================
// 藻类养殖 ATP 系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout, 减少并发写入时的偶发 busy 错误
// - 提供幂等建表 (ensure_schema)
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout (毫秒)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS lotes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tipo_alga TEXT NOT NULL,
    superficie REAL NOT NULL CHECK (superficie >= 0),
    fecha_inicio TEXT NOT NULL,
    fecha_cosecha_estimada TEXT,
    estado TEXT NOT NULL DEFAULT 'activo',
    creado_en TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS pedidos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cliente TEXT NOT NULL,
    producto TEXT NOT NULL,
    cantidad_ton REAL NOT NULL CHECK (cantidad_ton > 0),
    fecha_entrega TEXT NOT NULL,
    estado TEXT NOT NULL DEFAULT 'pendiente',
    creado_en TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS pesajes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lote_id INTEGER NOT NULL REFERENCES lotes(id) ON DELETE CASCADE,
    peso_humedo REAL NOT NULL CHECK (peso_humedo > 0),
    peso_seco REAL NOT NULL,
    fecha_pesaje TEXT NOT NULL,
    registrado_por TEXT NOT NULL,
    creado_en TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS clientes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    empresa TEXT NOT NULL UNIQUE,
    contacto TEXT,
    email TEXT,
    telefono TEXT,
    direccion TEXT,
    creado_en TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS parametros_sistema (
    clave TEXT PRIMARY KEY,
    valor TEXT NOT NULL,
    unidad TEXT,
    descripcion TEXT,
    categoria TEXT
);

CREATE TABLE IF NOT EXISTS configuracion_estacional (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre_estacion TEXT NOT NULL UNIQUE,
    meses_asociados TEXT NOT NULL,
    factor_biomasa REAL NOT NULL,
    factor_secado REAL NOT NULL,
    factor_energia REAL NOT NULL,
    factor_crecimiento REAL NOT NULL,
    descripcion TEXT
);

CREATE TABLE IF NOT EXISTS action_log (
    action_id TEXT PRIMARY KEY,
    action_type TEXT NOT NULL,
    action_ts TEXT NOT NULL,
    actor TEXT NOT NULL,
    payload_json TEXT,
    impact_summary_json TEXT,
    detail TEXT
);

CREATE INDEX IF NOT EXISTS idx_lotes_estado ON lotes(estado, fecha_cosecha_estimada);
CREATE INDEX IF NOT EXISTS idx_pedidos_entrega ON pedidos(fecha_entrega, estado);
CREATE INDEX IF NOT EXISTS idx_pedidos_cliente ON pedidos(cliente);
CREATE INDEX IF NOT EXISTS idx_pesajes_fecha ON pesajes(fecha_pesaje);
CREATE INDEX IF NOT EXISTS idx_action_log_ts ON action_log(action_ts);
CREATE INDEX IF NOT EXISTS idx_action_log_actor ON action_log(actor);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明:
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 幂等建表, 并登记 schema_version
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    tracing::debug!(version = CURRENT_SCHEMA_VERSION, "schema 已就绪");
    Ok(())
}

/// 读取 schema_version (若表不存在则返回 None)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), None);

        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN
                 ('lotes','pedidos','pesajes','clientes','parametros_sistema',
                  'configuracion_estacional','action_log')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 7);
    }
}
