//! Raydium 流动性指令的公共解码
//!
//! 各池子类型只提供两张表：discriminator → (事件类型, 指令名)，以及
//! (事件类型, 指令名) → [`ParseEventConfig`]。解码流程在这里统一完成：
//! mint 和数量优先取自指令下的转账，取不到时按配置的偏移从指令数据读取。

use log::{debug, warn};

use crate::core::error::ParseError;
use crate::core::transfer::get_all_transfers_for_instruction;
use crate::core::types::*;
use crate::core::unified_parser::ParseContext;
use crate::instr::utils::{get_account, read_u64_le};

/// 指令数据中三个数量字段的偏移（含 8 字节 discriminator）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmountOffsets {
    pub token0: usize,
    pub token1: usize,
    pub lp: usize,
}

/// 某类流动性指令的账户索引与数据偏移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseEventConfig {
    pub event_type: PoolEventType,
    pub pool_id_index: usize,
    pub lp_mint_index: usize,
    pub token_amount_offsets: Option<TokenAmountOffsets>,
}

/// Raydium 池子类型的指令表
pub trait RaydiumPoolTables {
    /// 按 discriminator 判断指令类别，返回 (类别, 指令名)
    fn pool_action(&self, data: &[u8]) -> Option<(PoolEventType, &'static str)>;

    /// 类别（及指令名）对应的解码配置
    fn event_config(&self, event_type: PoolEventType, name: &str) -> ParseEventConfig;
}

fn read_amount(data: &[u8], offset: Option<usize>) -> Option<u128> {
    offset.and_then(|offset| read_u64_le(data, offset)).map(u128::from)
}

/// 按配置解码一条流动性指令
pub fn parse_pool_event(
    ctx: &ParseContext<'_>,
    ix: &ClassifiedInstruction,
    config: &ParseEventConfig,
) -> Option<PoolEvent> {
    let accounts = ix.accounts();
    let pool_id = match get_account(accounts, config.pool_id_index) {
        Some(pool_id) => pool_id,
        None => {
            warn!(
                "{}: pool account #{} missing at {} ({} accounts)",
                ix.program_id,
                config.pool_id_index,
                ix.idx(),
                accounts.len()
            );
            return None;
        }
    };

    let transfers = get_all_transfers_for_instruction(ctx.transfers, &ix.key());
    let mut token_transfers = transfers.iter().filter(|t| t.transfer_type.is_transfer());
    let token0 = token_transfers.next();
    let token1 = token_transfers.next();
    let lp_type = match config.event_type {
        PoolEventType::Remove => TransferType::Burn,
        PoolEventType::Create | PoolEventType::Add => TransferType::MintTo,
    };
    let lp_transfer = transfers.iter().find(|t| t.transfer_type == lp_type);

    let data = ix.data();
    let offsets = config.token_amount_offsets;
    let adapter = ctx.adapter;

    let token0_mint = token0.map(|t| t.mint);
    let token1_mint = token1.map(|t| t.mint);
    let token0_decimals = token0
        .map(|t| t.decimals)
        .or_else(|| token0_mint.and_then(|m| adapter.token_decimals(&m)));
    let token1_decimals = token1
        .map(|t| t.decimals)
        .or_else(|| token1_mint.and_then(|m| adapter.token_decimals(&m)));
    let token0_raw = token0
        .map(|t| t.amount as u128)
        .or_else(|| read_amount(data, offsets.map(|o| o.token0)));
    let token1_raw = token1
        .map(|t| t.amount as u128)
        .or_else(|| read_amount(data, offsets.map(|o| o.token1)));

    let lp_mint = lp_transfer
        .map(|t| t.mint)
        .or_else(|| get_account(accounts, config.lp_mint_index));
    let lp_decimals = lp_transfer
        .map(|t| t.decimals)
        .or_else(|| lp_mint.and_then(|m| adapter.token_decimals(&m)))
        .unwrap_or(0);
    let lp_raw = lp_transfer
        .map(|t| t.amount as u128)
        .or_else(|| read_amount(data, offsets.map(|o| o.lp)));

    let user = adapter.account_key(0).unwrap_or_default();
    Some(
        ctx.pool_event(ix, config.event_type, user, pool_id)
            .with_token0(token0_mint, token0_raw, token0_decimals)
            .with_token1(token1_mint, token1_raw, token1_decimals)
            .with_lp(lp_mint, lp_raw, lp_decimals),
    )
}

/// 遍历上下文中的指令，解码所有命中的流动性指令
pub fn process_pool_liquidity<T: RaydiumPoolTables + ?Sized>(
    tables: &T,
    ctx: &ParseContext<'_>,
) -> Result<Vec<PoolEvent>, ParseError> {
    let mut events = Vec::new();
    for ix in &ctx.instructions {
        let (event_type, name) = match tables.pool_action(ix.data()) {
            Some(action) => action,
            None => continue,
        };
        let config = tables.event_config(event_type, name);
        debug!("{}: {} ({:?}) at {}", ix.program_id, name, event_type, ix.idx());
        if let Some(event) = parse_pool_event(ctx, ix, &config) {
            events.push(event);
        }
    }
    Ok(events)
}
