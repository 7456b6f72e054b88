// ==========================================
// SAN 配置导入 - 领域模型层
// ==========================================
// 职责: 定义解析结果、库存视图与领域类型
// 红线: 不含数据访问逻辑,不含解析逻辑
// ==========================================

pub mod inventory;
pub mod parsed;
pub mod types;

// 重导出核心类型
pub use inventory::{AliasRecord, FabricRecord, UpsertOutcome, ZoneMemberLink, ZoneRecord};
pub use parsed::{
    ParseResult, ParsedAlias, ParsedFabric, ParsedHost, ParsedPort, ParsedStorageSystem,
    ParsedSwitch, ParsedVolume, ParsedZone,
};
pub use types::{AliasKind, ImportType, PortUse, Vendor, ZoneKind};
