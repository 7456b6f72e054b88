// ==========================================
// SAN 配置导入 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 / busy_timeout）
// - 幂等建表（CREATE TABLE IF NOT EXISTS），写入 schema_version
// 级联: fabric → alias/zone → alias_wwpn/zone_member
//       storage_system → volume/host/storage_port
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前 schema 版本
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS wwpn_prefix (
    prefix TEXT PRIMARY KEY,
    wwpn_use TEXT NOT NULL,
    vendor TEXT
);

CREATE TABLE IF NOT EXISTS fabric (
    fabric_id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    zoneset_name TEXT,
    vsan INTEGER,
    vendor TEXT,
    exists_flag INTEGER NOT NULL DEFAULT 1,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (customer_id, name)
);

CREATE TABLE IF NOT EXISTS alias (
    alias_id INTEGER PRIMARY KEY AUTOINCREMENT,
    fabric_id INTEGER NOT NULL REFERENCES fabric(fabric_id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    alias_type TEXT NOT NULL,
    use_type TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (fabric_id, name)
);

CREATE TABLE IF NOT EXISTS alias_wwpn (
    alias_id INTEGER NOT NULL REFERENCES alias(alias_id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    wwpn TEXT NOT NULL,
    PRIMARY KEY (alias_id, position)
);
CREATE INDEX IF NOT EXISTS idx_alias_wwpn_wwpn ON alias_wwpn(wwpn);

CREATE TABLE IF NOT EXISTS zone (
    zone_id INTEGER PRIMARY KEY AUTOINCREMENT,
    fabric_id INTEGER NOT NULL REFERENCES fabric(fabric_id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    zone_type TEXT NOT NULL DEFAULT 'standard',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (fabric_id, name)
);

CREATE TABLE IF NOT EXISTS zone_member (
    zone_id INTEGER NOT NULL REFERENCES zone(zone_id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    alias_id INTEGER NOT NULL REFERENCES alias(alias_id) ON DELETE CASCADE,
    member_use TEXT,
    PRIMARY KEY (zone_id, position)
);

CREATE TABLE IF NOT EXISTS switch (
    switch_id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER NOT NULL,
    fabric_id INTEGER REFERENCES fabric(fabric_id) ON DELETE SET NULL,
    name TEXT NOT NULL,
    wwnn TEXT,
    model TEXT,
    serial_number TEXT,
    firmware_version TEXT,
    ip_address TEXT,
    domain_id INTEGER,
    vendor TEXT,
    is_active INTEGER NOT NULL DEFAULT 0,
    location TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_switch_customer_wwnn ON switch(customer_id, wwnn);

CREATE TABLE IF NOT EXISTS storage_system (
    storage_id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER NOT NULL,
    storage_system_id TEXT NOT NULL,
    name TEXT NOT NULL,
    storage_type TEXT,
    vendor TEXT,
    model TEXT,
    machine_type TEXT,
    serial_number TEXT,
    firmware_version TEXT,
    wwnn TEXT,
    ip_address TEXT,
    location TEXT,
    condition TEXT,
    status TEXT,
    capacity_bytes INTEGER,
    used_capacity_bytes INTEGER,
    available_capacity_bytes INTEGER,
    volume_count INTEGER,
    host_count INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (customer_id, storage_system_id)
);

CREATE TABLE IF NOT EXISTS volume (
    volume_pk INTEGER PRIMARY KEY AUTOINCREMENT,
    storage_id INTEGER NOT NULL REFERENCES storage_system(storage_id) ON DELETE CASCADE,
    volume_id TEXT NOT NULL,
    name TEXT NOT NULL,
    pool_name TEXT,
    capacity_bytes INTEGER,
    used_capacity_bytes INTEGER,
    thin_provisioned INTEGER,
    status TEXT,
    natural_key TEXT,
    updated_at TEXT NOT NULL,
    UNIQUE (storage_id, volume_id)
);

CREATE TABLE IF NOT EXISTS host (
    host_pk INTEGER PRIMARY KEY AUTOINCREMENT,
    storage_id INTEGER NOT NULL REFERENCES storage_system(storage_id) ON DELETE CASCADE,
    host_id TEXT NOT NULL,
    name TEXT NOT NULL,
    host_type TEXT,
    status TEXT,
    volume_count INTEGER,
    updated_at TEXT NOT NULL,
    UNIQUE (storage_id, name)
);

CREATE TABLE IF NOT EXISTS host_wwpn (
    host_pk INTEGER NOT NULL REFERENCES host(host_pk) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    wwpn TEXT NOT NULL,
    PRIMARY KEY (host_pk, position)
);

CREATE TABLE IF NOT EXISTS storage_port (
    port_pk INTEGER PRIMARY KEY AUTOINCREMENT,
    storage_id INTEGER NOT NULL REFERENCES storage_system(storage_id) ON DELETE CASCADE,
    port_id TEXT NOT NULL,
    name TEXT,
    wwpn TEXT,
    port_type TEXT,
    speed TEXT,
    status TEXT,
    location TEXT,
    use_type TEXT,
    updated_at TEXT NOT NULL,
    UNIQUE (storage_id, port_id)
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启（级联删除依赖它）
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

/// 幂等建表
///
/// 首次执行时写入 CURRENT_SCHEMA_VERSION
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    if read_schema_version(conn)?.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            rusqlite::params![CURRENT_SCHEMA_VERSION, chrono::Utc::now().to_rfc3339()],
        )?;
    }
    Ok(())
}

/// 读取 schema_version（若表不存在或为空则返回 None）
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
