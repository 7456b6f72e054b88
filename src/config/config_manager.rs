// ==========================================
// SAN 配置导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)、wwpn_prefix 表
// ==========================================

use crate::config::import_config_trait::{
    ConfigResult, ImportConfigReader, DEFAULT_PREVIEW_MEMBER_LIMIT, DEFAULT_RENAME_SUFFIX,
};
use crate::db::open_sqlite_connection;
use crate::domain::types::PortUse;
use crate::importer::wwpn::WwpnPrefixTable;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供 CLI 复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取 wwpn_prefix 表（prefix → wwpn_use）
    fn read_prefix_rows(&self) -> ConfigResult<HashMap<String, String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt = conn.prepare("SELECT prefix, wwpn_use FROM wwpn_prefix ORDER BY prefix")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut prefixes = HashMap::new();
        for row in rows {
            let (prefix, wwpn_use) = row?;
            prefixes.insert(prefix, wwpn_use);
        }
        Ok(prefixes)
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
impl ImportConfigReader for ConfigManager {
    fn get_rename_suffix(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::RENAME_SUFFIX, DEFAULT_RENAME_SUFFIX)?;
        if value.trim().is_empty() {
            Ok(DEFAULT_RENAME_SUFFIX.to_string())
        } else {
            Ok(value)
        }
    }

    fn get_preview_member_limit(&self) -> ConfigResult<usize> {
        let value = self.get_config_or_default(
            config_keys::PREVIEW_MEMBER_LIMIT,
            &DEFAULT_PREVIEW_MEMBER_LIMIT.to_string(),
        )?;
        Ok(value.trim().parse::<usize>().unwrap_or(DEFAULT_PREVIEW_MEMBER_LIMIT))
    }

    fn get_preview_check_conflicts(&self) -> ConfigResult<bool> {
        let value = self.get_config_or_default(config_keys::PREVIEW_CHECK_CONFLICTS, "true")?;
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Ok(true), // 默认 true
        }
    }

    fn load_wwpn_prefix_table(&self) -> ConfigResult<WwpnPrefixTable> {
        let rows = self.read_prefix_rows()?;
        if rows.is_empty() {
            return Ok(WwpnPrefixTable::with_defaults());
        }

        let mut table = WwpnPrefixTable::new();
        for (prefix, wwpn_use) in rows {
            match PortUse::parse(&wwpn_use) {
                Some(use_type) => table.insert(&prefix, use_type),
                None => warn!(prefix = %prefix, wwpn_use = %wwpn_use, "wwpn_prefix 用途无法识别，已忽略"),
            }
        }
        Ok(table)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 冲突处理
    pub const RENAME_SUFFIX: &str = "import.rename_suffix";

    // 预览
    pub const PREVIEW_MEMBER_LIMIT: &str = "import.preview_member_limit";
    pub const PREVIEW_CHECK_CONFLICTS: &str = "import.preview_check_conflicts";
}
