//! 指令解析器模块
//!
//! 每个 DEX 协议一个解析器，按程序 ID 分派：
//! - Jupiter：路由事件解码 + 多跳聚合
//! - Meteora / Orca：由转账推导 swap
//! - PumpSwap：inner 事件解码
//! - Raydium CLMM / CPMM：按偏移解码流动性指令

pub mod jupiter;
pub mod meteora;
pub mod orca;
pub mod program_ids;
pub mod pump_amm;
pub mod pump_amm_inner;
pub mod raydium_clmm;
pub mod raydium_cpmm;
pub mod raydium_lp;
pub mod utils;

// 重新导出工具函数
pub use utils::*;
