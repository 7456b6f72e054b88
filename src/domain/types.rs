// ==========================================
// SAN 配置导入 - 领域类型定义
// ==========================================
// 职责: 厂商标签、别名类型、端口用途、Zone 类型、导入类型
// 序列化格式: 与外部 JSON 契约一致（小写/连字符）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 厂商标签 (Vendor)
// ==========================================
// BR = Brocade, CI = Cisco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vendor {
    #[serde(rename = "BR")]
    Brocade,
    #[serde(rename = "CI")]
    Cisco,
}

impl Vendor {
    pub fn code(&self) -> &'static str {
        match self {
            Vendor::Brocade => "BR",
            Vendor::Cisco => "CI",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "BR" => Some(Vendor::Brocade),
            "CI" => Some(Vendor::Cisco),
            _ => None,
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 别名类型 (Alias Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AliasKind {
    DeviceAlias, // Cisco device-alias（全局，单 WWPN）
    Fcalias,     // Cisco fcalias / Brocade alias（可多 WWPN）
    Wwpn,        // 由裸 WWPN 合成的别名
}

impl AliasKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AliasKind::DeviceAlias => "device-alias",
            AliasKind::Fcalias => "fcalias",
            AliasKind::Wwpn => "wwpn",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "device-alias" => Some(AliasKind::DeviceAlias),
            "fcalias" => Some(AliasKind::Fcalias),
            "wwpn" => Some(AliasKind::Wwpn),
            _ => None,
        }
    }
}

impl fmt::Display for AliasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 端口用途 (Port Use)
// ==========================================
// 未知用途以 Option<PortUse>::None 表示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortUse {
    Init,   // 启动器（主机 HBA）
    Target, // 目标端（存储端口）
    Both,   // 兼具
}

impl PortUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortUse::Init => "init",
            PortUse::Target => "target",
            PortUse::Both => "both",
        }
    }

    /// 解析成员行尾部的 init/target/both 标记
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "init" | "initiator" => Some(PortUse::Init),
            "target" => Some(PortUse::Target),
            "both" => Some(PortUse::Both),
            _ => None,
        }
    }
}

impl fmt::Display for PortUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Zone 类型 (Zone Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    #[default]
    Standard,
    Peer, // 区分 init/target 的 peer zone（Cisco smart zoning / Brocade peer zone）
}

impl ZoneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Standard => "standard",
            ZoneKind::Peer => "peer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "standard" => Some(ZoneKind::Standard),
            "peer" => Some(ZoneKind::Peer),
            _ => None,
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 导入类型 (Import Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportType {
    #[default]
    San,     // 交换机/Fabric/别名/Zone
    Storage, // 存储系统/卷/主机/端口
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportType::San => write!(f, "san"),
            ImportType::Storage => write!(f, "storage"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_use_parse() {
        assert_eq!(PortUse::parse("target"), Some(PortUse::Target));
        assert_eq!(PortUse::parse(" INIT "), Some(PortUse::Init));
        assert_eq!(PortUse::parse("both"), Some(PortUse::Both));
        assert_eq!(PortUse::parse(""), None);
    }

    #[test]
    fn test_serde_wire_names() {
        assert_eq!(serde_json::to_string(&Vendor::Cisco).unwrap(), "\"CI\"");
        assert_eq!(
            serde_json::to_string(&AliasKind::DeviceAlias).unwrap(),
            "\"device-alias\""
        );
        assert_eq!(serde_json::to_string(&ZoneKind::Peer).unwrap(), "\"peer\"");
        assert_eq!(serde_json::to_string(&ImportType::Storage).unwrap(), "\"storage\"");
    }
}
