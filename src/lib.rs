// ==========================================
// SAN 配置导入管道 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 厂商交换机/存储配置 → 统一库存模型（人工确认冲突后落库）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 解析结果与库存视图
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 解析器、冲突处理、编排器
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AliasKind, ImportType, PortUse, Vendor, ZoneKind};

// 领域实体
pub use domain::{
    ParseResult, ParsedAlias, ParsedFabric, ParsedHost, ParsedPort, ParsedStorageSystem,
    ParsedSwitch, ParsedVolume, ParsedZone,
};

// 导入
pub use importer::{
    CommitStats, ConflictResolution, ConflictResolutions, ImportError, ImportOrchestrator,
    ImportResult, ParserRegistry, PreviewSummary, SanParser,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "SAN 配置导入管道";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
