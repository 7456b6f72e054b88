// ==========================================
// SAN 配置导入 - 解析器注册表 / 格式检测
// ==========================================
// 职责: 按显式优先级顺序探测解析器，返回第一个匹配者
// 说明: 注册表是构造后传入的值，不使用全局可变注册
// ==========================================

use crate::importer::brocade_parser::BrocadeParser;
use crate::importer::cisco_parser::CiscoParser;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::insights_parser::{InsightsClientFactory, InsightsParser};
use crate::importer::parser_trait::{ParserFactory, SanParser};
use crate::importer::wwpn::WwpnPrefixLookup;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// ParserRegistry
// ==========================================
pub struct ParserRegistry {
    factories: Vec<(&'static str, ParserFactory)>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// 标准注册顺序
    ///
    /// 1. insights: 仅接受含 tenant_id/api_key 的 JSON，先探测避免被文本解析器误认
    /// 2. cisco
    /// 3. brocade
    pub fn standard(
        prefixes: Arc<dyn WwpnPrefixLookup>,
        insights_clients: Option<Arc<dyn InsightsClientFactory>>,
    ) -> Self {
        let mut registry = Self::new();

        if let Some(clients) = insights_clients {
            registry.register("insights", move || {
                Box::new(InsightsParser::new(clients.clone())) as Box<dyn SanParser>
            });
        }

        let cisco_prefixes = prefixes.clone();
        registry.register("cisco", move || {
            Box::new(CiscoParser::new(cisco_prefixes.clone())) as Box<dyn SanParser>
        });

        registry.register("brocade", move || {
            Box::new(BrocadeParser::new(prefixes.clone())) as Box<dyn SanParser>
        });

        registry
    }

    /// 追加解析器工厂（追加顺序即探测顺序）
    pub fn register<F>(&mut self, name: &'static str, factory: F)
    where
        F: Fn() -> Box<dyn SanParser> + Send + Sync + 'static,
    {
        self.factories.push((name, Box::new(factory)));
    }

    /// 已注册解析器名称（按探测顺序）
    pub fn names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|(name, _)| *name).collect()
    }

    /// 检测格式
    ///
    /// # 返回
    /// - Ok(parser): 第一个 detect_format 成功的解析器
    /// - Err(FormatUnsupported): 无解析器匹配
    pub fn detect(&self, text: &str) -> ImportResult<Box<dyn SanParser>> {
        for (name, factory) in &self.factories {
            let parser = factory();
            if parser.detect_format(text) {
                debug!(parser = %name, "格式检测命中");
                return Ok(parser);
            }
        }

        Err(ImportError::FormatUnsupported(format!(
            "没有解析器能识别该输入（已尝试: {}）",
            self.names().join(", ")
        )))
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
