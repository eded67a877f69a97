//! Solana DEX 交易解析器核心模块
//!
//! - 统一的交易/流动性记录类型
//! - 转账归属、多跳聚合、手续费对账
//! - 按协议分派的统一解析入口

pub mod adapter;      // 交易状态读取接口
pub mod aggregator;   // 多跳路由聚合
pub mod amount;       // 精确数量换算
pub mod config;
pub mod error;
pub mod fee;          // 手续费对账
pub mod transfer;     // 转账查找与 swap 推导
pub mod types;
pub mod unified_parser; // 统一解析器 - 单一入口

// 主要导出
pub use adapter::{TransactionAdapter, TxContext};
pub use config::ParseConfig;
pub use error::ParseError;
pub use types::*;
pub use unified_parser::{DexParser, LiquidityParser, ParseContext, Protocol, TradeParser};
