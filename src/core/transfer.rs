//! 转账相关的共享处理
//!
//! - 按所属 DEX 指令查找转账
//! - 从转账推导 swap（无显式事件的协议）
//! - 为交易记录附加实现它的转账信息

use log::debug;
use solana_sdk::pubkey::Pubkey;

use crate::core::adapter::{swap_signer, TransactionAdapter};
use crate::core::error::ParseError;
use crate::core::types::*;
use crate::core::unified_parser::ParseContext;
use crate::instr::program_ids::tokens;

/// 根据输入/输出 mint 判断交易方向
///
/// 输入是基础代币 → 买入；输出是基础代币 → 卖出；两边都不是 → 普通兑换
pub fn get_trade_type(input_mint: &Pubkey, output_mint: &Pubkey) -> TradeType {
    if tokens::is_base(input_mint) {
        TradeType::Buy
    } else if tokens::is_base(output_mint) {
        TradeType::Sell
    } else {
        TradeType::Swap
    }
}

/// 指令下的普通转账（transfer / transferChecked）
pub fn get_transfers_for_instruction<'a>(
    transfers: &'a TransferMap,
    key: &InstructionKey,
) -> Vec<&'a TransferData> {
    transfers
        .get(key)
        .map(|list| list.iter().filter(|t| t.transfer_type.is_transfer()).collect())
        .unwrap_or_default()
}

/// 指令下的全部转账，包含 mintTo / burn
pub fn get_all_transfers_for_instruction<'a>(
    transfers: &'a TransferMap,
    key: &InstructionKey,
) -> Vec<&'a TransferData> {
    transfers.get(key).map(|list| list.iter().collect()).unwrap_or_default()
}

/// 参与 swap 的一种代币
#[derive(Debug, Clone, Copy)]
struct SwapToken {
    mint: Pubkey,
    decimals: u8,
    source: Pubkey,
    authority: Option<Pubkey>,
}

/// 按出现顺序去重的 mint 列表
fn unique_tokens(transfers: &[&TransferData]) -> Vec<SwapToken> {
    let mut tokens: Vec<SwapToken> = Vec::with_capacity(2);
    for transfer in transfers {
        if tokens.iter().all(|t| t.mint != transfer.mint) {
            tokens.push(SwapToken {
                mint: transfer.mint,
                decimals: transfer.decimals,
                source: transfer.source,
                authority: transfer.authority,
            });
        }
    }
    tokens
}

/// 分别累加输入和输出 mint 的数量，相同 (source, destination, amount) 的转账只计一次
fn sum_token_amounts(
    transfers: &[&TransferData],
    input_mint: &Pubkey,
    output_mint: &Pubkey,
) -> Result<(u128, u128), ParseError> {
    let mut seen: Vec<(Pubkey, Pubkey, u64)> = Vec::with_capacity(transfers.len());
    let mut input_amount: u128 = 0;
    let mut output_amount: u128 = 0;

    for transfer in transfers {
        let triple = (transfer.source, transfer.destination, transfer.amount);
        if seen.contains(&triple) {
            continue;
        }
        seen.push(triple);

        if transfer.mint == *input_mint {
            input_amount = input_amount
                .checked_add(transfer.amount as u128)
                .ok_or(ParseError::AmountOverflow { mint: *input_mint })?;
        }
        if transfer.mint == *output_mint {
            output_amount = output_amount
                .checked_add(transfer.amount as u128)
                .ok_or(ParseError::AmountOverflow { mint: *output_mint })?;
        }
    }

    Ok((input_amount, output_amount))
}

/// 从一条指令的转账推导 swap
///
/// 第一个 mint 视为输入、最后一个视为输出；若输出代币由签名者转出则二者互换。
/// 少于两种 mint 时不产生交易。
pub fn process_swap_data<A: TransactionAdapter + ?Sized>(
    adapter: &A,
    transfers: &[&TransferData],
    dex_info: &DexInfo,
) -> Result<Option<TradeInfo>, ParseError> {
    let tokens = unique_tokens(transfers);
    if tokens.len() < 2 {
        debug!("insufficient unique tokens for swap: {}", tokens.len());
        return Ok(None);
    }

    let signer = swap_signer(adapter);
    let mut input = tokens[0];
    let mut output = tokens[tokens.len() - 1];
    if output.source == signer || output.authority == Some(signer) {
        std::mem::swap(&mut input, &mut output);
    }

    let (input_amount, output_amount) = sum_token_amounts(transfers, &input.mint, &output.mint)?;
    let idx = transfers.first().map(|t| t.idx.clone()).unwrap_or_default();

    Ok(Some(TradeInfo {
        trade_type: get_trade_type(&input.mint, &output.mint),
        input_token: TokenAmount::new(input.mint, input_amount, input.decimals),
        output_token: TokenAmount::new(output.mint, output_amount, output.decimals),
        fee: None,
        fees: Vec::new(),
        user: signer,
        program_id: dex_info.program_id,
        amm: dex_info.amm.clone().unwrap_or_default(),
        route: dex_info.route.clone(),
        slot: adapter.slot(),
        timestamp: adapter.block_time(),
        signature: adapter.signature(),
        idx,
    }))
}

/// 无显式 swap 事件的协议：跳过流动性指令，其余指令由其转账推导 swap
///
/// 指令 payload 为空时按非流动性指令处理；少于两笔转账视为证据不足。
pub fn process_transfer_swaps(
    ctx: &ParseContext<'_>,
    is_liquidity: fn(&[u8]) -> bool,
) -> Result<Vec<TradeInfo>, ParseError> {
    let mut trades = Vec::new();
    for ix in &ctx.instructions {
        if is_liquidity(ix.data()) {
            debug!("{}: liquidity instruction at {}, not a swap", ix.program_id, ix.idx());
            continue;
        }

        let transfers = get_transfers_for_instruction(ctx.transfers, &ix.key());
        if transfers.len() < 2 {
            debug!("{}: {} transfers at {}, not enough for a swap", ix.program_id, transfers.len(), ix.idx());
            continue;
        }

        let dex_info = ctx.dex_info_for(&ix.program_id);
        if let Some(trade) = process_swap_data(ctx.adapter, &transfers, &dex_info)? {
            trades.push(attach_token_transfer_info(trade, ctx.transfers));
        }
    }
    Ok(trades)
}

/// 在全部转账中找到与某一侧 mint、数量一致的第一笔（按指令顺序）
fn find_transfer<'a>(transfers: &'a TransferMap, token: &TokenAmount) -> Option<&'a TransferData> {
    transfers
        .values()
        .flatten()
        .filter(|t| t.mint == token.mint && t.amount.to_string() == token.amount_raw)
        .min_by_key(|t| (t.outer_index, t.inner_index.map_or(0, |i| i as u64 + 1)))
}

fn apply_transfer(token: &mut TokenAmount, transfer: &TransferData) {
    token.authority = transfer.authority;
    token.source = Some(transfer.source);
    token.destination = Some(transfer.destination);
    token.destination_owner = transfer.destination_owner;
}

/// 为交易的输入/输出附加对应转账的 authority / source / destination
pub fn attach_token_transfer_info(mut trade: TradeInfo, transfers: &TransferMap) -> TradeInfo {
    if let Some(transfer) = find_transfer(transfers, &trade.input_token) {
        apply_transfer(&mut trade.input_token, transfer);
    }
    if let Some(transfer) = find_transfer(transfers, &trade.output_token) {
        apply_transfer(&mut trade.output_token, transfer);
    }
    trade
}
