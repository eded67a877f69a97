//! 交易解析数据模型
//!
//! 上游（指令分类、转账提取）产出的输入类型，以及解析器产出的
//! `TradeInfo` / `PoolEvent` 输出类型。

use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::collections::HashMap;
use std::fmt;

use crate::core::amount::{parse_raw, to_ui_amount};

/// 单条指令（外层或内层），账户已解析为 Pubkey
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolanaInstruction {
    pub program_id: Pubkey,
    pub accounts: Vec<Pubkey>,
    /// 原始指令数据；为空表示无 payload
    pub data: Vec<u8>,
    pub inner_instructions: Option<Vec<SolanaInstruction>>,
}

/// 已分类的指令 - 由上游按 (outer_index, inner_index) 排好序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedInstruction {
    pub program_id: Pubkey,
    pub instruction: SolanaInstruction,
    pub outer_index: u32,
    pub inner_index: Option<u32>,
}

impl ClassifiedInstruction {
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.instruction.data
    }

    #[inline]
    pub fn accounts(&self) -> &[Pubkey] {
        &self.instruction.accounts
    }

    /// "outer-inner" 形式的来源标识，外层指令 inner 记为 0
    pub fn idx(&self) -> String {
        format_idx(self.outer_index, self.inner_index)
    }

    pub fn key(&self) -> InstructionKey {
        InstructionKey {
            program_id: self.program_id,
            outer_index: self.outer_index,
            inner_index: self.inner_index,
        }
    }
}

pub fn format_idx(outer_index: u32, inner_index: Option<u32>) -> String {
    format!("{}-{}", outer_index, inner_index.unwrap_or(0))
}

/// idx 排序键："outer-inner" 按数值比较（"10-0" 排在 "3-0" 之后）
pub fn idx_order(idx: &str) -> (u32, u32) {
    let mut parts = idx.split('-').map(|p| p.parse::<u32>().unwrap_or(0));
    (parts.next().unwrap_or(0), parts.next().unwrap_or(0))
}

/// 转账归属的 DEX 指令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstructionKey {
    pub program_id: Pubkey,
    pub outer_index: u32,
    pub inner_index: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferType {
    Transfer,
    TransferChecked,
    MintTo,
    Burn,
}

impl TransferType {
    /// 普通转账（不含 mint/burn）
    #[inline]
    pub fn is_transfer(self) -> bool {
        matches!(self, TransferType::Transfer | TransferType::TransferChecked)
    }
}

/// 交易中观察到的一次代币/SOL 转账
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferData {
    pub transfer_type: TransferType,
    pub program_id: Pubkey,
    pub outer_index: u32,
    pub inner_index: Option<u32>,
    pub authority: Option<Pubkey>,
    pub source: Pubkey,
    pub destination: Pubkey,
    pub destination_owner: Option<Pubkey>,
    pub mint: Pubkey,
    pub amount: u64,
    pub decimals: u8,
    pub idx: String,
}

/// 按所属 DEX 指令分组的转账
pub type TransferMap = HashMap<InstructionKey, Vec<TransferData>>;

/// 当前解析的协议上下文
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DexInfo {
    pub program_id: Option<Pubkey>,
    pub amm: Option<String>,
    pub route: Option<String>,
}

/// 余额变化（原始单位，带符号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalanceChange {
    pub pre: i128,
    pub post: i128,
    pub change: i128,
    pub decimals: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Buy,
    Sell,
    Swap,
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::Buy => write!(f, "BUY"),
            TradeType::Sell => write!(f, "SELL"),
            TradeType::Swap => write!(f, "SWAP"),
        }
    }
}

/// 代币数量
///
/// `amount_raw` 为精确的最小单位整数字符串，`amount` 为按 decimals 缩放后的十进制字符串。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenAmount {
    pub mint: Pubkey,
    pub amount: String,
    pub amount_raw: String,
    pub decimals: u8,
    /// 观察到的实际余额变化（原始单位，带符号）
    pub balance_change: Option<String>,
    pub authority: Option<Pubkey>,
    pub source: Option<Pubkey>,
    pub destination: Option<Pubkey>,
    pub destination_owner: Option<Pubkey>,
}

impl TokenAmount {
    pub fn new(mint: Pubkey, amount_raw: u128, decimals: u8) -> Self {
        Self {
            mint,
            amount: to_ui_amount(amount_raw, decimals),
            amount_raw: amount_raw.to_string(),
            decimals,
            ..Default::default()
        }
    }

    /// `amount_raw` 解析回整数；构造时保证合法
    #[inline]
    pub fn raw(&self) -> u128 {
        parse_raw(&self.amount_raw).unwrap_or_default()
    }

    pub(crate) fn set_raw(&mut self, amount_raw: u128) {
        self.amount = to_ui_amount(amount_raw, self.decimals);
        self.amount_raw = amount_raw.to_string();
    }
}

/// 费用明细项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeInfo {
    pub mint: Pubkey,
    pub amount: String,
    pub amount_raw: String,
    pub decimals: u8,
    pub dex: Option<String>,
    pub fee_type: Option<String>,
}

impl FeeInfo {
    pub fn new(mint: Pubkey, amount_raw: u128, decimals: u8) -> Self {
        Self {
            mint,
            amount: to_ui_amount(amount_raw, decimals),
            amount_raw: amount_raw.to_string(),
            decimals,
            dex: None,
            fee_type: None,
        }
    }

    pub fn with_type(mut self, dex: &str, fee_type: &str) -> Self {
        self.dex = Some(dex.to_string());
        self.fee_type = Some(fee_type.to_string());
        self
    }
}

/// 规范化的交易记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeInfo {
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub input_token: TokenAmount,
    pub output_token: TokenAmount,
    pub fee: Option<FeeInfo>,
    pub fees: Vec<FeeInfo>,
    pub user: Pubkey,
    pub program_id: Option<Pubkey>,
    pub amm: String,
    pub route: Option<String>,
    pub slot: u64,
    pub timestamp: i64,
    pub signature: Signature,
    pub idx: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PoolEventType {
    #[default]
    Create,
    Add,
    Remove,
}

/// 流动性事件（创建池/添加/移除）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolEvent {
    pub user: Pubkey,
    pub event_type: PoolEventType,
    pub program_id: Pubkey,
    pub amm: String,
    pub slot: u64,
    pub timestamp: i64,
    pub signature: Signature,
    pub idx: String,
    pub pool_id: Pubkey,
    pub pool_lp_mint: Option<Pubkey>,
    pub token0_mint: Option<Pubkey>,
    pub token1_mint: Option<Pubkey>,
    pub token0_amount: Option<String>,
    pub token0_amount_raw: Option<String>,
    pub token1_amount: Option<String>,
    pub token1_amount_raw: Option<String>,
    pub token0_decimals: Option<u8>,
    pub token1_decimals: Option<u8>,
    pub lp_amount: Option<String>,
    pub lp_amount_raw: Option<String>,
}

impl PoolEvent {
    pub fn with_token0(mut self, mint: Option<Pubkey>, amount_raw: Option<u128>, decimals: Option<u8>) -> Self {
        self.token0_mint = mint;
        self.token0_decimals = decimals;
        self.token0_amount_raw = amount_raw.map(|raw| raw.to_string());
        self.token0_amount = amount_raw.map(|raw| to_ui_amount(raw, decimals.unwrap_or(0)));
        self
    }

    pub fn with_token1(mut self, mint: Option<Pubkey>, amount_raw: Option<u128>, decimals: Option<u8>) -> Self {
        self.token1_mint = mint;
        self.token1_decimals = decimals;
        self.token1_amount_raw = amount_raw.map(|raw| raw.to_string());
        self.token1_amount = amount_raw.map(|raw| to_ui_amount(raw, decimals.unwrap_or(0)));
        self
    }

    pub fn with_lp(mut self, lp_mint: Option<Pubkey>, amount_raw: Option<u128>, decimals: u8) -> Self {
        self.pool_lp_mint = lp_mint;
        self.lp_amount_raw = amount_raw.map(|raw| raw.to_string());
        self.lp_amount = amount_raw.map(|raw| to_ui_amount(raw, decimals));
        self
    }
}

/// 单笔交易的完整解析结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub slot: u64,
    pub timestamp: i64,
    pub signature: Signature,
    pub trades: Vec<TradeInfo>,
    pub liquidities: Vec<PoolEvent>,
}
