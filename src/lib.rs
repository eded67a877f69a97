// 核心模块 - 扁平化结构
pub mod core;
pub mod instr; // 指令解析器

// 重新导出主要API - 单一入口解析器
pub use crate::core::{
    // 记录类型
    BalanceChange, ClassifiedInstruction, DexInfo, FeeInfo, InstructionKey, ParseResult,
    PoolEvent, PoolEventType, SolanaInstruction, TokenAmount, TradeInfo, TradeType,
    TransferData, TransferMap, TransferType,
    // 解析入口
    DexParser, ParseConfig, ParseError,
    // 交易状态
    TransactionAdapter, TxContext,
};
