// ==========================================
// SAN 配置导入 - 冲突处理器
// ==========================================
// 职责:
//   - 批次内别名去重 (fabric_name, name)
//   - 过滤无别名/zone 引用的 Fabric（支持 VSAN 等价: vsan75 ≡ vsan0075）
//   - 与已有库存的同名冲突检测（仅供人工决策，不自动应用策略）
// ==========================================

use crate::domain::inventory::{AliasRecord, ZoneRecord};
use crate::domain::parsed::{ParsedAlias, ParsedFabric, ParsedZone};
use crate::domain::types::{AliasKind, PortUse, ZoneKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static VSAN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^vsan0*(\d+)$").expect("vsan name pattern"));

/// 从 Fabric 名称中提取 VSAN 号（vsan75 / VSAN0075 → 75）
pub fn vsan_number(name: &str) -> Option<u32> {
    VSAN_NAME
        .captures(name.trim())
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

// ==========================================
// 冲突展示数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingAlias {
    pub fabric_name: String,
    pub alias_type: AliasKind,
    pub use_type: Option<PortUse>,
    pub wwpns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasConflict {
    pub name: String,
    pub existing: Vec<ExistingAlias>,
    pub new_fabric_name: String,
    pub new_alias_type: AliasKind,
    pub new_use_type: Option<PortUse>,
    pub new_wwpns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingZone {
    pub fabric_name: String,
    pub zone_type: ZoneKind,
    pub member_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConflict {
    pub name: String,
    pub existing: Vec<ExistingZone>,
    pub new_fabric_name: String,
    pub new_zone_type: ZoneKind,
    pub new_member_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportConflicts {
    pub aliases: Vec<AliasConflict>,
    pub zones: Vec<ZoneConflict>,
}

impl ImportConflicts {
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.zones.is_empty()
    }

    pub fn len(&self) -> usize {
        self.aliases.len() + self.zones.len()
    }
}

// ==========================================
// ConflictHandler
// ==========================================
pub struct ConflictHandler;

impl ConflictHandler {
    /// 批次内别名去重
    ///
    /// 键为 (fabric_name, name)。保留首次出现；若保留项 use 为空而后续重复项
    /// 带有 use，则由后续项取代（位置不变）。
    ///
    /// # 返回
    /// - (去重后的别名, 移除的重复数)
    pub fn dedupe_aliases(&self, aliases: &[ParsedAlias]) -> (Vec<ParsedAlias>, usize) {
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        let mut kept: Vec<ParsedAlias> = Vec::with_capacity(aliases.len());
        let mut removed = 0;

        for alias in aliases {
            let key = (alias.fabric_name.clone(), alias.name.clone());
            match index.get(&key) {
                Some(&pos) => {
                    removed += 1;
                    if kept[pos].use_type.is_none() && alias.use_type.is_some() {
                        kept[pos] = alias.clone();
                    }
                }
                None => {
                    index.insert(key, kept.len());
                    kept.push(alias.clone());
                }
            }
        }

        (kept, removed)
    }

    /// Fabric 是否与某个引用名称等价（同名，或 VSAN 号相同）
    pub fn fabric_matches(&self, fabric: &ParsedFabric, referenced_name: &str) -> bool {
        if fabric.name == referenced_name {
            return true;
        }
        let Some(referenced_vsan) = vsan_number(referenced_name) else {
            return false;
        };
        fabric.vsan.or_else(|| vsan_number(&fabric.name)) == Some(referenced_vsan)
    }

    /// 过滤没有任何别名/zone 引用的 Fabric
    ///
    /// # 返回
    /// - (保留的 Fabric, 跳过数)
    pub fn filter_fabrics(
        &self,
        fabrics: &[ParsedFabric],
        aliases: &[ParsedAlias],
        zones: &[ParsedZone],
    ) -> (Vec<ParsedFabric>, usize) {
        let referenced: HashSet<&str> = aliases
            .iter()
            .map(|a| a.fabric_name.as_str())
            .chain(zones.iter().map(|z| z.fabric_name.as_str()))
            .filter(|name| !name.is_empty())
            .collect();

        let mut kept = Vec::new();
        let mut skipped = 0;
        for fabric in fabrics {
            if referenced.iter().any(|name| self.fabric_matches(fabric, name)) {
                kept.push(fabric.clone());
            } else {
                skipped += 1;
            }
        }
        (kept, skipped)
    }

    /// 别名冲突检测（同一客户范围内同名）
    pub fn detect_alias_conflicts(
        &self,
        aliases: &[ParsedAlias],
        existing: &[AliasRecord],
    ) -> Vec<AliasConflict> {
        let mut by_name: HashMap<&str, Vec<&AliasRecord>> = HashMap::new();
        for record in existing {
            by_name.entry(record.name.as_str()).or_default().push(record);
        }

        aliases
            .iter()
            .filter_map(|alias| {
                let matches = by_name.get(alias.name.as_str())?;
                Some(AliasConflict {
                    name: alias.name.clone(),
                    existing: matches
                        .iter()
                        .map(|r| ExistingAlias {
                            fabric_name: r.fabric_name.clone(),
                            alias_type: r.alias_type,
                            use_type: r.use_type,
                            wwpns: r.wwpns.clone(),
                        })
                        .collect(),
                    new_fabric_name: alias.fabric_name.clone(),
                    new_alias_type: alias.alias_type,
                    new_use_type: alias.use_type,
                    new_wwpns: alias.wwpns.clone(),
                })
            })
            .collect()
    }

    /// Zone 冲突检测（同一客户范围内同名）
    pub fn detect_zone_conflicts(
        &self,
        zones: &[ParsedZone],
        existing: &[ZoneRecord],
    ) -> Vec<ZoneConflict> {
        let mut by_name: HashMap<&str, Vec<&ZoneRecord>> = HashMap::new();
        for record in existing {
            by_name.entry(record.name.as_str()).or_default().push(record);
        }

        zones
            .iter()
            .filter_map(|zone| {
                let matches = by_name.get(zone.name.as_str())?;
                Some(ZoneConflict {
                    name: zone.name.clone(),
                    existing: matches
                        .iter()
                        .map(|r| ExistingZone {
                            fabric_name: r.fabric_name.clone(),
                            zone_type: r.zone_type,
                            member_count: r.member_count,
                        })
                        .collect(),
                    new_fabric_name: zone.fabric_name.clone(),
                    new_zone_type: zone.zone_type,
                    new_member_count: zone.members.len(),
                })
            })
            .collect()
    }
}
