// ==========================================
// SAN 配置导入 - 冲突解决策略
// ==========================================
// 外部输入两种形态:
//   "rename"                                  （旧版裸字符串）
//   {"action": "rename", "suffix": "_old"}    （结构化）
// 在边界处统一归一化为 ConflictResolution，业务逻辑只见枚举
// ==========================================

use crate::importer::error::ImportError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 冲突解决动作
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawResolution", into = "RawResolution")]
pub enum ConflictResolution {
    Skip,
    Replace,
    Rename { suffix: Option<String> },
    #[default]
    Reference,
}

impl ConflictResolution {
    pub fn action(&self) -> &'static str {
        match self {
            ConflictResolution::Skip => "skip",
            ConflictResolution::Replace => "replace",
            ConflictResolution::Rename { .. } => "rename",
            ConflictResolution::Reference => "reference",
        }
    }

    fn from_action(action: &str, suffix: Option<String>) -> Result<Self, ImportError> {
        match action.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(ConflictResolution::Skip),
            "replace" => Ok(ConflictResolution::Replace),
            "rename" => Ok(ConflictResolution::Rename {
                suffix: suffix.filter(|s| !s.is_empty()),
            }),
            "reference" | "" => Ok(ConflictResolution::Reference),
            other => Err(ImportError::InvalidResolution(other.to_string())),
        }
    }
}

// 线上形态
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawResolution {
    Action(String),
    Structured {
        action: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suffix: Option<String>,
    },
}

impl TryFrom<RawResolution> for ConflictResolution {
    type Error = ImportError;

    fn try_from(raw: RawResolution) -> Result<Self, Self::Error> {
        match raw {
            RawResolution::Action(action) => ConflictResolution::from_action(&action, None),
            RawResolution::Structured { action, suffix } => {
                ConflictResolution::from_action(&action, suffix)
            }
        }
    }
}

impl From<ConflictResolution> for RawResolution {
    fn from(resolution: ConflictResolution) -> Self {
        match resolution {
            ConflictResolution::Rename { suffix: Some(suffix) } => RawResolution::Structured {
                action: "rename".to_string(),
                suffix: Some(suffix),
            },
            other => RawResolution::Action(other.action().to_string()),
        }
    }
}

/// 调用方提供的按名称冲突解决映射
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictResolutions {
    pub aliases: HashMap<String, ConflictResolution>,
    pub zones: HashMap<String, ConflictResolution>,
}

impl ConflictResolutions {
    pub fn for_alias(&self, name: &str) -> ConflictResolution {
        self.aliases.get(name).cloned().unwrap_or_default()
    }

    pub fn for_zone(&self, name: &str) -> ConflictResolution {
        self.zones.get(name).cloned().unwrap_or_default()
    }
}
