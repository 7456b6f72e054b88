// ==========================================
// SAN 配置导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 实体级问题写入 ParseResult.errors/warnings，
//       只有格式无法识别、事务中止等才以 Err 返回
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 输入格式错误 =====
    #[error("WWPN 格式无效: {0}（需要 16 位十六进制）")]
    InvalidWwpnFormat(String),

    #[error("无法识别的输入格式: {0}")]
    FormatUnsupported(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),

    // ===== 冲突策略错误 =====
    #[error("无效的冲突处理策略: {0}")]
    InvalidResolution(String),

    // ===== 落库错误 =====
    #[error("目标 Fabric 不存在: fabric_id={fabric_id}")]
    FabricNotFound { fabric_id: i64 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
