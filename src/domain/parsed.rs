// ==========================================
// SAN 配置导入 - 解析结果领域模型
// ==========================================
// 用途: 解析器输出、编排器只读输入
// 生命周期: 由一次 parse 调用生成，此后不再修改字段
//           （rename 冲突策略只替换 name 字符串）
// ==========================================

use crate::domain::types::{AliasKind, ImportType, PortUse, Vendor, ZoneKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ==========================================
// ParsedFabric - Fabric（Cisco VSAN / Brocade Fabric）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFabric {
    pub name: String,                 // 解析期身份（Cisco 常为 vsan{N}，Brocade 为 SAN Health Fabric 名）
    pub vsan: Option<u32>,            // 仅 Cisco
    pub zoneset_name: Option<String>, // 生效 zoneset
    pub vendor: Vendor,
    pub exists: bool,                 // 交换机上是否存在（非 active VSAN 为 false）
    pub notes: Option<String>,
}

impl ParsedFabric {
    pub fn new(name: impl Into<String>, vendor: Vendor) -> Self {
        Self {
            name: name.into(),
            vsan: None,
            zoneset_name: None,
            vendor,
            exists: true,
            notes: None,
        }
    }
}

// ==========================================
// ParsedAlias - 别名
// ==========================================
// 不变式: wwpns 全部为归一化格式；wwpns[0] 为主 WWPN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAlias {
    pub name: String,
    pub wwpns: Vec<String>,
    pub alias_type: AliasKind,
    pub use_type: Option<PortUse>,
    pub fabric_name: String,
}

impl ParsedAlias {
    /// 主 WWPN（兼容单 WWPN 的下游消费者）
    pub fn primary_wwpn(&self) -> Option<&str> {
        self.wwpns.first().map(String::as_str)
    }
}

// ==========================================
// ParsedZone - Zone
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedZone {
    pub name: String,
    pub members: Vec<String>, // 别名名称或归一化 WWPN
    pub zone_type: ZoneKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub member_types: BTreeMap<String, PortUse>, // 仅 peer zone
    pub fabric_name: String,
}

// ==========================================
// ParsedSwitch - 交换机
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSwitch {
    pub name: String,
    pub wwnn: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub firmware_version: Option<String>,
    pub ip_address: Option<String>,
    pub domain_id: Option<i32>,
    pub fabric_name: Option<String>,
    pub vendor: Option<Vendor>,
    pub is_active: bool,
    pub location: Option<String>,
}

// ==========================================
// 存储域记录（storage_system_id 仅作 ParseResult 内部关联键）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedStorageSystem {
    pub storage_system_id: String,
    pub name: String,
    pub storage_type: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub machine_type: Option<String>,
    pub serial_number: Option<String>,
    pub firmware_version: Option<String>,
    pub wwnn: Option<String>,
    pub ip_address: Option<String>,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub status: Option<String>,
    pub capacity_bytes: Option<i64>,
    pub used_capacity_bytes: Option<i64>,
    pub available_capacity_bytes: Option<i64>,
    pub volume_count: Option<i64>,
    pub host_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedVolume {
    pub volume_id: String,
    pub storage_system_id: String,
    pub name: String,
    pub pool_name: Option<String>,
    pub capacity_bytes: Option<i64>,
    pub used_capacity_bytes: Option<i64>,
    pub thin_provisioned: Option<bool>,
    pub status: Option<String>,
    pub natural_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedHost {
    pub host_id: String,
    pub storage_system_id: String,
    pub name: String,
    pub host_type: Option<String>,
    pub wwpns: Vec<String>,
    pub status: Option<String>,
    pub volume_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedPort {
    pub port_id: String,
    pub storage_system_id: String,
    pub name: Option<String>,
    pub wwpn: Option<String>,
    pub port_type: Option<String>,
    pub speed: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub use_type: Option<PortUse>,
}

// ==========================================
// ParseResult - 解析结果聚合
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub fabrics: Vec<ParsedFabric>,
    pub aliases: Vec<ParsedAlias>,
    pub zones: Vec<ParsedZone>,
    pub switches: Vec<ParsedSwitch>,
    pub storage_systems: Vec<ParsedStorageSystem>,
    pub volumes: Vec<ParsedVolume>,
    pub hosts: Vec<ParsedHost>,
    pub ports: Vec<ParsedPort>,
    pub errors: Vec<String>,   // 实体级失败（该实体被丢弃，导入继续）
    pub warnings: Vec<String>, // 软异常
    pub metadata: HashMap<String, serde_json::Value>,
    pub import_type: ImportType,
}

impl ParseResult {
    pub fn new(import_type: ImportType) -> Self {
        Self {
            import_type,
            ..Default::default()
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn set_metadata(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否解析出任何实体
    pub fn is_empty(&self) -> bool {
        self.fabrics.is_empty()
            && self.aliases.is_empty()
            && self.zones.is_empty()
            && self.switches.is_empty()
            && self.storage_systems.is_empty()
            && self.volumes.is_empty()
            && self.hosts.is_empty()
            && self.ports.is_empty()
    }

    /// 合并另一个结果（组合 CSV 分段解析使用）
    ///
    /// Fabric 按名称去重，其余实体直接追加
    pub fn merge(&mut self, other: ParseResult) {
        for fabric in other.fabrics {
            if !self.fabrics.iter().any(|f| f.name == fabric.name) {
                self.fabrics.push(fabric);
            }
        }
        self.aliases.extend(other.aliases);
        self.zones.extend(other.zones);
        self.switches.extend(other.switches);
        self.storage_systems.extend(other.storage_systems);
        self.volumes.extend(other.volumes);
        self.hosts.extend(other.hosts);
        self.ports.extend(other.ports);
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        for (key, value) in other.metadata {
            self.metadata.entry(key).or_insert(value);
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "fabrics={}, aliases={}, zones={}, switches={}, storage_systems={}, volumes={}, hosts={}, ports={}, errors={}, warnings={}",
            self.fabrics.len(),
            self.aliases.len(),
            self.zones.len(),
            self.switches.len(),
            self.storage_systems.len(),
            self.volumes.len(),
            self.hosts.len(),
            self.ports.len(),
            self.errors.len(),
            self.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_dedupes_fabrics_by_name() {
        let mut left = ParseResult::new(ImportType::San);
        left.fabrics.push(ParsedFabric::new("FAB_A", Vendor::Brocade));
        left.add_warning("w1");

        let mut right = ParseResult::new(ImportType::San);
        right.fabrics.push(ParsedFabric::new("FAB_A", Vendor::Brocade));
        right.fabrics.push(ParsedFabric::new("FAB_B", Vendor::Brocade));
        right.add_error("e1");

        left.merge(right);

        assert_eq!(left.fabrics.len(), 2);
        assert_eq!(left.warnings, vec!["w1".to_string()]);
        assert_eq!(left.errors, vec!["e1".to_string()]);
    }

    #[test]
    fn test_primary_wwpn_is_first() {
        let alias = ParsedAlias {
            name: "host1".to_string(),
            wwpns: vec![
                "10:00:00:00:c9:12:34:56".to_string(),
                "10:00:00:00:c9:12:34:57".to_string(),
            ],
            alias_type: AliasKind::Fcalias,
            use_type: None,
            fabric_name: "vsan10".to_string(),
        };
        assert_eq!(alias.primary_wwpn(), Some("10:00:00:00:c9:12:34:56"));
    }
}
