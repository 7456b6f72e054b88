// ==========================================
// SAN 配置导入 - 应用状态
// ==========================================
// 职责: 打开数据库、建表、组装共享连接上的仓储/配置/编排器
// ==========================================

use std::sync::{Arc, Mutex};

use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::{ImportOrchestrator, InsightsClientFactory};
use crate::repository::SqliteSanRepository;

/// SQLite 组装的导入编排器
pub type SanImporter = ImportOrchestrator<SqliteSanRepository, ConfigManager>;

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 导入编排器
    pub importer: SanImporter,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    /// - insights_clients: Insights 远程客户端工厂（None 时不注册 insights 解析器）
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(
        db_path: String,
        insights_clients: Option<Arc<dyn InsightsClientFactory>>,
    ) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let repo = SqliteSanRepository::from_connection(conn.clone());
        let config = ConfigManager::from_connection(conn)
            .map_err(|e| format!("无法初始化配置管理器: {}", e))?;

        let importer = ImportOrchestrator::with_standard_registry(repo, config, insights_clients)
            .map_err(|e| format!("无法初始化导入编排器: {}", e))?;

        Ok(Self { db_path, importer })
    }
}

/// 获取默认数据库路径
///
/// 优先级: SAN_IMPORT_DB_PATH 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("SAN_IMPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./san_import.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("san-import");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("san_import.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_bootstraps_schema() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let db_path = file.path().to_string_lossy().to_string();

        let state = AppState::new(db_path.clone(), None).unwrap();
        assert_eq!(state.db_path, db_path);

        let conn = open_sqlite_connection(&db_path).unwrap();
        assert!(crate::db::read_schema_version(&conn).unwrap().is_some());
    }
}
