//! 多跳 swap 聚合
//!
//! 路由聚合器把一次兑换拆成多条 leg（A→B, B→C, ...）。按 mint 累加输入/输出，
//! 输入输出总量相等的 mint 视为中间代币抵消，最终只剩一个输入 mint 和一个输出 mint
//! 时才产出交易；其他情况一律放弃，不做猜测。

use log::debug;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

use crate::core::error::ParseError;
use crate::core::transfer::get_trade_type;
use crate::core::types::{format_idx, idx_order, TokenAmount, TradeInfo};

/// 一条已解码的 swap leg
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapLeg {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub input_amount: u128,
    pub output_amount: u128,
    pub input_decimals: u8,
    pub output_decimals: u8,
    pub amm: String,
    pub outer_index: u32,
    pub inner_index: Option<u32>,
}

impl SwapLeg {
    #[inline]
    fn position(&self) -> (u32, u32) {
        (self.outer_index, self.inner_index.unwrap_or(0))
    }
}

/// 抵消后的净兑换
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetSwap {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub input_amount: u128,
    pub output_amount: u128,
    pub input_decimals: u8,
    pub output_decimals: u8,
    /// amm 标签，按 leg 出现顺序
    pub amms: Vec<String>,
    /// 最早一条 leg 的位置
    pub idx: String,
}

fn accumulate(map: &mut HashMap<Pubkey, u128>, mint: Pubkey, amount: u128) -> Result<(), ParseError> {
    let total = map.entry(mint).or_insert(0);
    *total = total
        .checked_add(amount)
        .ok_or(ParseError::AmountOverflow { mint })?;
    Ok(())
}

/// 聚合一组 leg
///
/// 返回 `Ok(None)` 表示抵消后不是恰好一进一出。
pub fn aggregate_legs(legs: &[SwapLeg]) -> Result<Option<NetSwap>, ParseError> {
    let first = match legs.iter().min_by_key(|leg| leg.position()) {
        Some(leg) => leg,
        None => return Ok(None),
    };

    let mut token_in: HashMap<Pubkey, u128> = HashMap::new();
    let mut token_out: HashMap<Pubkey, u128> = HashMap::new();
    let mut decimals: HashMap<Pubkey, u8> = HashMap::new();
    let mut amms: Vec<String> = Vec::with_capacity(legs.len());

    for leg in legs {
        accumulate(&mut token_in, leg.input_mint, leg.input_amount)?;
        accumulate(&mut token_out, leg.output_mint, leg.output_amount)?;
        decimals.entry(leg.input_mint).or_insert(leg.input_decimals);
        decimals.entry(leg.output_mint).or_insert(leg.output_decimals);
        amms.push(leg.amm.clone());
    }

    // 中间代币：买入后又全部卖出
    let intermediate: Vec<Pubkey> = token_in
        .iter()
        .filter(|(mint, amount)| token_out.get(*mint) == Some(*amount))
        .map(|(mint, _)| *mint)
        .collect();
    for mint in &intermediate {
        token_in.remove(mint);
        token_out.remove(mint);
    }

    if token_in.len() != 1 || token_out.len() != 1 {
        debug!(
            "ambiguous route netting at {}: {} input mints, {} output mints, no trade",
            format_idx(first.outer_index, first.inner_index),
            token_in.len(),
            token_out.len()
        );
        return Ok(None);
    }

    let (input_mint, input_amount) = token_in.into_iter().next().unwrap_or_default();
    let (output_mint, output_amount) = token_out.into_iter().next().unwrap_or_default();
    if input_mint == output_mint {
        debug!(
            "circular route at {} nets to {} on both sides, no trade",
            format_idx(first.outer_index, first.inner_index),
            input_mint
        );
        return Ok(None);
    }

    Ok(Some(NetSwap {
        input_mint,
        output_mint,
        input_amount,
        output_amount,
        input_decimals: decimals.get(&input_mint).copied().unwrap_or(0),
        output_decimals: decimals.get(&output_mint).copied().unwrap_or(0),
        amms,
        idx: format_idx(first.outer_index, first.inner_index),
    }))
}

/// 把同一笔交易中多个外层路由各自产出的交易合并为一笔最终交易
///
/// 输入 mint 取最早一笔的输入，输出 mint 取最后一笔的输出，数量分别对同 mint 求和。
pub fn merge_final_swap(mut trades: Vec<TradeInfo>) -> Result<Option<TradeInfo>, ParseError> {
    if trades.len() <= 1 {
        let trade = trades.pop().filter(|t| t.input_token.mint != t.output_token.mint);
        return Ok(trade);
    }

    trades.sort_by_key(|trade| idx_order(&trade.idx));

    let first = &trades[0];
    let last = &trades[trades.len() - 1];
    let input_mint = first.input_token.mint;
    let input_decimals = first.input_token.decimals;
    let output_mint = last.output_token.mint;
    let output_decimals = last.output_token.decimals;

    let mut input_amount: u128 = 0;
    let mut output_amount: u128 = 0;
    for trade in &trades {
        if trade.input_token.mint == input_mint {
            input_amount = input_amount
                .checked_add(trade.input_token.raw())
                .ok_or(ParseError::AmountOverflow { mint: input_mint })?;
        }
        if trade.output_token.mint == output_mint {
            output_amount = output_amount
                .checked_add(trade.output_token.raw())
                .ok_or(ParseError::AmountOverflow { mint: output_mint })?;
        }
    }

    if input_mint == output_mint {
        debug!("final swap collapses to a single mint {}, no trade", input_mint);
        return Ok(None);
    }

    let mut merged = trades.swap_remove(0);
    merged.trade_type = get_trade_type(&input_mint, &output_mint);
    merged.input_token = TokenAmount::new(input_mint, input_amount, input_decimals);
    merged.output_token = TokenAmount::new(output_mint, output_amount, output_decimals);
    Ok(Some(merged))
}
