// ==========================================
// SAN 配置导入 - 解析器契约
// ==========================================
// 职责: 定义所有厂商解析器的统一接口（不包含实现）
// 实现者: CiscoParser, BrocadeParser, InsightsParser
// ==========================================

use crate::domain::parsed::ParseResult;
use crate::importer::error::ImportResult;

// ==========================================
// SanParser Trait
// ==========================================
pub trait SanParser: Send + Sync {
    /// 解析器名称（写入预览结果与日志）
    fn name(&self) -> &'static str;

    /// 结构嗅探
    ///
    /// # 约束
    /// - 不得 panic、不得有副作用（注册表会依次探测多个解析器）
    /// - 只做廉价的子串/标记检查
    fn detect_format(&self, text: &str) -> bool;

    /// 完整解析
    ///
    /// # 返回
    /// - Ok(ParseResult): 实体级问题累积在 errors/warnings 中
    /// - Err(FormatUnsupported): 空输入等不可恢复的结构性失败
    fn parse(&self, text: &str) -> ImportResult<ParseResult>;
}

// ==========================================
// ParserFactory - 解析器工厂
// ==========================================
// 注册表保存工厂而非实例，每次检测得到全新的解析器状态
pub type ParserFactory = Box<dyn Fn() -> Box<dyn SanParser> + Send + Sync>;
