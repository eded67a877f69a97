//! 解析错误定义
//!
//! 只有结构性错误才会返回 `Err`：已匹配 discriminator 的 payload 解码失败，
//! 或必需的账户 → mint 映射缺失。未匹配、歧义聚合、转账不足都不是错误。

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    /// 已匹配的事件/指令 payload 解码失败
    #[error("{protocol} decode failed at {idx}: {reason}")]
    Decode {
        protocol: &'static str,
        idx: String,
        reason: String,
    },

    /// 事件要求的 mint 无法通过 token 账户解析
    #[error("{protocol} {role} mint not found at {idx}")]
    MissingMint {
        protocol: &'static str,
        idx: String,
        role: &'static str,
    },

    /// 金额累加溢出
    #[error("amount overflow while summing {mint}")]
    AmountOverflow { mint: Pubkey },
}

impl ParseError {
    pub fn decode(protocol: &'static str, idx: impl Into<String>, reason: impl ToString) -> Self {
        ParseError::Decode {
            protocol,
            idx: idx.into(),
            reason: reason.to_string(),
        }
    }
}
