// ==========================================
// SAN 配置导入 - 导入层
// ==========================================
// 职责: 厂商配置解析、WWPN 归一化、冲突检测、事务化落库编排
// 支持: Cisco show tech-support / running-config,
//       Brocade SAN Health CSV / cfgshow, Insights 远程存储清单
// ==========================================

// 模块声明
pub mod brocade_parser;
pub mod cisco_parser;
pub mod conflict_handler;
pub mod error;
pub mod insights_parser;
pub mod orchestrator;
pub mod parser_trait;
pub mod registry;
pub mod resolution;
pub mod wwpn;

// 重导出核心类型
pub use brocade_parser::BrocadeParser;
pub use cisco_parser::CiscoParser;
pub use conflict_handler::{AliasConflict, ConflictHandler, ImportConflicts, ZoneConflict};
pub use error::{ImportError, ImportResult};
pub use insights_parser::{
    InsightsClient, InsightsClientFactory, InsightsCredentials, InsightsImportOptions,
    InsightsParser, InsightsPayload, ProgressCallback,
};
pub use orchestrator::{CommitStats, ImportOrchestrator, PreviewSummary, ZonePreview};
pub use registry::ParserRegistry;
pub use resolution::{ConflictResolution, ConflictResolutions};
pub use wwpn::{WwpnPrefixLookup, WwpnPrefixTable};

// 重导出 Trait 接口
pub use parser_trait::SanParser;
