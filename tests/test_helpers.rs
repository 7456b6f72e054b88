// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、编排器组装、落库结果查询
// ==========================================
#![allow(dead_code)]

use rusqlite::{params, Connection};
use san_import::app::SanImporter;
use san_import::config::ConfigManager;
use san_import::db::{init_schema, open_sqlite_connection};
use san_import::importer::{ImportOrchestrator, InsightsClientFactory};
use san_import::repository::SqliteSanRepository;
use std::error::Error;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// 测试客户 ID
pub const CUSTOMER_ID: i64 = 1;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("临时路径非 UTF-8")?.to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 组装使用标准注册表的编排器
pub fn create_test_importer(db_path: &str) -> SanImporter {
    create_test_importer_with_insights(db_path, None)
}

pub fn create_test_importer_with_insights(
    db_path: &str,
    insights: Option<Arc<dyn InsightsClientFactory>>,
) -> SanImporter {
    let repo = SqliteSanRepository::new(db_path).expect("Failed to create SqliteSanRepository");
    let config = ConfigManager::new(db_path).expect("Failed to create ConfigManager");
    ImportOrchestrator::with_standard_registry(repo, config, insights)
        .expect("Failed to create ImportOrchestrator")
}

/// 写入 global 配置
pub fn insert_test_config(db_path: &str, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let conn = Connection::open(db_path)?;
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

/// 表行数
pub fn count_rows(db_path: &str, table: &str) -> i64 {
    let conn = Connection::open(db_path).expect("open db");
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .expect("count rows")
}

/// 全部别名名称（按名称排序）
pub fn alias_names(db_path: &str) -> Vec<String> {
    let conn = Connection::open(db_path).expect("open db");
    let mut stmt = conn.prepare("SELECT name FROM alias ORDER BY name").expect("prepare");
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .expect("query");
    rows.map(|r| r.expect("row")).collect()
}

/// 别名的 WWPN 列表（按位置）
pub fn alias_wwpns(db_path: &str, alias_name: &str) -> Vec<String> {
    let conn = Connection::open(db_path).expect("open db");
    let mut stmt = conn
        .prepare(
            "SELECT w.wwpn FROM alias_wwpn w JOIN alias a ON a.alias_id = w.alias_id
             WHERE a.name = ?1 ORDER BY w.position",
        )
        .expect("prepare");
    let rows = stmt
        .query_map(params![alias_name], |row| row.get::<_, String>(0))
        .expect("query");
    rows.map(|r| r.expect("row")).collect()
}

/// Zone 成员对应的别名名称（按位置）
pub fn zone_member_names(db_path: &str, zone_name: &str) -> Vec<String> {
    let conn = Connection::open(db_path).expect("open db");
    let mut stmt = conn
        .prepare(
            "SELECT a.name FROM zone_member m
             JOIN zone z ON z.zone_id = m.zone_id
             JOIN alias a ON a.alias_id = m.alias_id
             WHERE z.name = ?1 ORDER BY m.position",
        )
        .expect("prepare");
    let rows = stmt
        .query_map(params![zone_name], |row| row.get::<_, String>(0))
        .expect("query");
    rows.map(|r| r.expect("row")).collect()
}

/// 创建一个已存在的 Fabric，返回 fabric_id
pub fn insert_fabric(db_path: &str, customer_id: i64, name: &str) -> i64 {
    let conn = Connection::open(db_path).expect("open db");
    conn.execute(
        "INSERT INTO fabric (customer_id, name, vendor, created_at, updated_at)
         VALUES (?1, ?2, 'BR', datetime('now'), datetime('now'))",
        params![customer_id, name],
    )
    .expect("insert fabric");
    conn.last_insert_rowid()
}
