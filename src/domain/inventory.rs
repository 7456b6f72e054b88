// ==========================================
// SAN 配置导入 - 已有库存记录视图
// ==========================================
// 用途: Repository 查询结果（冲突检测、成员解析）
// 红线: 只读视图，不含业务逻辑
// ==========================================

use crate::domain::types::{AliasKind, PortUse, Vendor, ZoneKind};
use serde::{Deserialize, Serialize};

// ==========================================
// FabricRecord - 已落库 Fabric
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricRecord {
    pub fabric_id: i64,
    pub customer_id: i64,
    pub name: String,
    pub zoneset_name: Option<String>,
    pub vsan: Option<u32>,
    pub vendor: Option<Vendor>,
}

// ==========================================
// AliasRecord - 已落库别名（含所属 Fabric 名）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasRecord {
    pub alias_id: i64,
    pub fabric_id: i64,
    pub fabric_name: String,
    pub name: String,
    pub alias_type: AliasKind,
    pub use_type: Option<PortUse>,
    pub wwpns: Vec<String>,
}

impl AliasRecord {
    pub fn primary_wwpn(&self) -> Option<&str> {
        self.wwpns.first().map(String::as_str)
    }
}

// ==========================================
// ZoneRecord - 已落库 Zone
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub zone_id: i64,
    pub fabric_id: i64,
    pub fabric_name: String,
    pub name: String,
    pub zone_type: ZoneKind,
    pub member_count: usize,
}

// ==========================================
// ZoneMemberLink - 待写入的 Zone 成员
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneMemberLink {
    pub alias_id: i64,
    pub member_use: Option<PortUse>,
}

// ==========================================
// UpsertOutcome - get-or-create 结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(i64),
    Updated(i64),
}

impl UpsertOutcome {
    pub fn id(&self) -> i64 {
        match self {
            UpsertOutcome::Created(id) | UpsertOutcome::Updated(id) => *id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}
