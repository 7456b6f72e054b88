// ==========================================
// SAN 配置导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入编排器所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::wwpn::WwpnPrefixTable;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// 默认 rename 后缀
pub const DEFAULT_RENAME_SUFFIX: &str = "_copy";

/// 预览中 zone 成员列表的默认截断长度
pub const DEFAULT_PREVIEW_MEMBER_LIMIT: usize = 10;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入编排器所需的配置读取接口
// 实现者: ConfigManager（从 config_kv / wwpn_prefix 表读取）
pub trait ImportConfigReader: Send + Sync {
    /// 获取 rename 冲突策略的默认后缀
    ///
    /// # 默认值
    /// - "_copy"
    fn get_rename_suffix(&self) -> ConfigResult<String>;

    /// 获取预览中 zone 成员的最大展示数
    ///
    /// # 默认值
    /// - 10
    fn get_preview_member_limit(&self) -> ConfigResult<usize>;

    /// 预览时是否默认执行冲突检测
    ///
    /// # 默认值
    /// - true
    fn get_preview_check_conflicts(&self) -> ConfigResult<bool>;

    /// 加载 WWPN 厂商前缀表
    ///
    /// # 返回
    /// - wwpn_prefix 表非空: 表内容
    /// - 否则: 内置厂商前缀表
    fn load_wwpn_prefix_table(&self) -> ConfigResult<WwpnPrefixTable>;
}
