// ==========================================
// SAN 配置导入 - WWPN 工具
// ==========================================
// 职责: WWPN 归一化 / 校验 / 按厂商前缀分类（init/target）
// 格式: 小写、冒号分隔、16 位十六进制（aa:bb:cc:dd:ee:ff:00:11）
// 说明: 前缀表为注入的只读协作者，分类为纯函数
// ==========================================

use crate::domain::types::PortUse;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;

/// WWPN 十六进制位数
pub const WWPN_HEX_LEN: usize = 16;

/// 分类使用的前缀位数
pub const PREFIX_LEN: usize = 4;

// ==========================================
// WwpnPrefixLookup Trait
// ==========================================
// 用途: 厂商前缀 → 端口用途查询
// 实现者: WwpnPrefixTable（内置表 / wwpn_prefix 表加载）
pub trait WwpnPrefixLookup: Send + Sync {
    /// 查询 4 位小写十六进制前缀
    fn lookup(&self, prefix: &str) -> Option<PortUse>;
}

// ==========================================
// WwpnPrefixTable - 前缀表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct WwpnPrefixTable {
    entries: HashMap<String, PortUse>,
}

impl WwpnPrefixTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置厂商前缀表
    ///
    /// HBA（Emulex/QLogic/IBM NPIV）为 init，
    /// 主流阵列（EMC/NetApp/IBM/Pure/HPE）为 target
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for prefix in ["1000", "2100", "2101", "2001", "c050"] {
            table.insert(prefix, PortUse::Init);
        }
        for prefix in ["5006", "500a", "5005", "5001", "524a", "2ff7", "5000", "5008"] {
            table.insert(prefix, PortUse::Target);
        }
        table
    }

    pub fn insert(&mut self, prefix: &str, use_type: PortUse) {
        let key: String = prefix
            .chars()
            .filter(char::is_ascii_hexdigit)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if key.len() == PREFIX_LEN {
            self.entries.insert(key, use_type);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl WwpnPrefixLookup for WwpnPrefixTable {
    fn lookup(&self, prefix: &str) -> Option<PortUse> {
        self.entries.get(prefix).copied()
    }
}

/// 提取全部十六进制字符并转小写
fn hex_digits(wwpn: &str) -> String {
    wwpn.chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// 归一化 WWPN
///
/// # 返回
/// - Ok(String): `aa:bb:cc:dd:ee:ff:00:11`
/// - Err(InvalidWwpnFormat): 去除非十六进制字符后不是 16 位
pub fn normalize(wwpn: &str) -> ImportResult<String> {
    let hex = hex_digits(wwpn);
    if hex.len() != WWPN_HEX_LEN {
        return Err(ImportError::InvalidWwpnFormat(wwpn.to_string()));
    }

    let groups: Vec<&str> = (0..WWPN_HEX_LEN)
        .step_by(2)
        .map(|i| &hex[i..i + 2])
        .collect();
    Ok(groups.join(":"))
}

/// 校验 WWPN（不抛错）
pub fn is_valid(wwpn: &str) -> bool {
    hex_digits(wwpn).len() == WWPN_HEX_LEN
}

/// 按厂商前缀分类
///
/// 无法归一化或前缀未登记时返回 None
pub fn classify(wwpn: &str, lookup: &dyn WwpnPrefixLookup) -> Option<PortUse> {
    let hex = hex_digits(wwpn);
    if hex.len() != WWPN_HEX_LEN {
        return None;
    }
    lookup.lookup(&hex[..PREFIX_LEN])
}

/// 判断 token 是否"形如" WWPN
///
/// 比 is_valid 严格: 只接受 16 位裸十六进制或 8 组冒号分隔的十六进制，
/// 避免把恰好含 16 个十六进制字符的别名名称误判为 WWPN
pub fn looks_like_wwpn(token: &str) -> bool {
    let token = token.trim();
    if token.len() == WWPN_HEX_LEN {
        return token.chars().all(|c| c.is_ascii_hexdigit());
    }
    let groups: Vec<&str> = token.split(':').collect();
    groups.len() == 8
        && groups
            .iter()
            .all(|g| g.len() == 2 && g.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_separator_styles() {
        assert_eq!(
            normalize("10:00:00:00:C9:12:34:56").unwrap(),
            "10:00:00:00:c9:12:34:56"
        );
        assert_eq!(normalize("10000000c9123456").unwrap(), "10:00:00:00:c9:12:34:56");
        assert_eq!(
            normalize("10-00-00-00-c9-12-34-56").unwrap(),
            "10:00:00:00:c9:12:34:56"
        );
    }

    #[test]
    fn test_normalize_rejects_wrong_length() {
        assert!(matches!(
            normalize("10:00:00:00:c9:12:34"),
            Err(ImportError::InvalidWwpnFormat(_))
        ));
        assert!(normalize("").is_err());
        assert!(!is_valid("10:00:00:00:c9:12:34:56:78"));
    }

    #[test]
    fn test_classify_uses_first_four_digits() {
        let table = WwpnPrefixTable::with_defaults();
        assert_eq!(classify("10:00:00:00:c9:12:34:56", &table), Some(PortUse::Init));
        assert_eq!(classify("50:06:01:60:3b:20:11:22", &table), Some(PortUse::Target));
        assert_eq!(classify("ab:cd:00:00:00:00:00:01", &table), None);
        assert_eq!(classify("not-a-wwpn", &table), None);
    }

    #[test]
    fn test_looks_like_wwpn_shapes() {
        assert!(looks_like_wwpn("10:00:00:00:c9:12:34:56"));
        assert!(looks_like_wwpn("10000000C9123456"));
        assert!(!looks_like_wwpn("host_a_fc0"));
        assert!(!looks_like_wwpn("10:00:00:00:c9:12:34"));
        assert!(!looks_like_wwpn("1000-0000-c912-3456"));
    }

    #[test]
    fn test_prefix_table_insert_normalizes_key() {
        let mut table = WwpnPrefixTable::new();
        table.insert("52:4A", PortUse::Target);
        table.insert("123", PortUse::Init); // 长度不足，忽略
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("524a"), Some(PortUse::Target));
    }
}
