use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// 解析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// 只解析这些程序；None 表示不过滤
    pub program_ids: Option<Vec<Pubkey>>,
    /// 跳过这些程序
    pub ignore_program_ids: Option<Vec<Pubkey>>,
    /// Jupiter 多个外层路由各自产生交易时，是否合并为一笔最终交易
    pub aggregate_trades: bool,
    /// 结构性解码错误是否中止整笔交易的解析
    /// 关闭后，出错的协议不产出记录，其他协议照常解析
    pub throw_on_error: bool,
    /// 预设的 amm 标签，覆盖按程序 ID 查到的名称
    pub amm: Option<String>,
    /// 预设的路由标签
    pub route: Option<String>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            program_ids: None,
            ignore_program_ids: None,
            aggregate_trades: true,
            throw_on_error: true,
            amm: None,
            route: None,
        }
    }
}

impl ParseConfig {
    pub fn only(program_ids: Vec<Pubkey>) -> Self {
        Self {
            program_ids: Some(program_ids),
            ..Default::default()
        }
    }

    /// 从 JSON 加载，缺省字段使用默认值
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 程序是否在解析范围内
    pub fn should_parse(&self, program_id: &Pubkey) -> bool {
        if let Some(ref include) = self.program_ids {
            if !include.contains(program_id) {
                return false;
            }
        }
        if let Some(ref ignore) = self.ignore_program_ids {
            if ignore.contains(program_id) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();

        assert!(ParseConfig::default().should_parse(&a));

        let config = ParseConfig::only(vec![a]);
        assert!(config.should_parse(&a));
        assert!(!config.should_parse(&b));

        let config = ParseConfig {
            ignore_program_ids: Some(vec![b]),
            ..Default::default()
        };
        assert!(config.should_parse(&a));
        assert!(!config.should_parse(&b));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ParseConfig::from_json(r#"{"throw_on_error": false}"#).unwrap();
        assert!(!config.throw_on_error);
        assert!(config.aggregate_trades);
        assert!(config.program_ids.is_none());
        assert!(config.amm.is_none());

        let config = ParseConfig::from_json(r#"{"route": "OKX"}"#).unwrap();
        assert_eq!(config.route.as_deref(), Some("OKX"));

        assert!(ParseConfig::from_json(r#"{"aggregate_trades": "yes"}"#).is_err());
    }
}
