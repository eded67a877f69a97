//! PumpSwap (Pump AMM) 解析器
//!
//! 交易来自 Buy / Sell 事件，流动性事件来自 CreatePool / Deposit / Withdraw 事件。
//! 事件只给出 token 账户，mint 通过适配器的 token 账户映射解析。

use log::error;
use solana_sdk::pubkey::Pubkey;

use crate::core::error::ParseError;
use crate::core::transfer::{attach_token_transfer_info, get_trade_type};
use crate::core::types::*;
use crate::core::unified_parser::{LiquidityParser, ParseContext, TradeParser};
use crate::instr::pump_amm_inner::{
    parse_event, PumpSwapCreatePoolEvent, PumpSwapEvent, PumpSwapLiquidityEvent, PumpSwapTradeEvent,
};

const PROTOCOL: &str = "pumpswap";

/// LP mint 精度，适配器查不到时使用
pub const LP_DECIMALS: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Buy,
    Sell,
}

pub struct PumpswapParser;

fn resolve_mint(
    ctx: &ParseContext<'_>,
    token_account: &Pubkey,
    idx: &str,
    role: &'static str,
) -> Result<(Pubkey, u8), ParseError> {
    let mint = ctx
        .adapter
        .token_account_mint(token_account)
        .ok_or_else(|| {
            error!("pumpswap {} mint not found for {} at {}", role, token_account, idx);
            ParseError::MissingMint {
                protocol: PROTOCOL,
                idx: idx.to_string(),
                role,
            }
        })?;
    Ok((mint, ctx.adapter.token_decimals(&mint).unwrap_or(0)))
}

impl PumpswapParser {
    fn build_trade(
        &self,
        ctx: &ParseContext<'_>,
        ix: &ClassifiedInstruction,
        side: Side,
        event: &PumpSwapTradeEvent,
    ) -> Result<TradeInfo, ParseError> {
        let idx = ix.idx();
        let (input_account, output_account) = match side {
            Side::Buy => (&event.user_quote_token_account, &event.user_base_token_account),
            Side::Sell => (&event.user_base_token_account, &event.user_quote_token_account),
        };
        let (input_mint, input_decimals) = resolve_mint(ctx, input_account, &idx, "input")?;
        let (output_mint, output_decimals) = resolve_mint(ctx, output_account, &idx, "output")?;
        let (fee_mint, fee_decimals) =
            resolve_mint(ctx, &event.protocol_fee_recipient_token_account, &idx, "fee")?;

        let (input_amount, output_amount, quote_mint, quote_decimals) = match side {
            Side::Buy => (event.user_quote_amount, event.base_amount, input_mint, input_decimals),
            Side::Sell => (event.base_amount, event.user_quote_amount, output_mint, output_decimals),
        };

        let dex = ctx.amm_label(&ix.program_id);
        let total_fee = event.protocol_fee as u128 + event.coin_creator_fee as u128;
        let fees = vec![
            FeeInfo::new(quote_mint, event.lp_fee as u128, quote_decimals).with_type(&dex, "lp"),
            FeeInfo::new(fee_mint, event.protocol_fee as u128, fee_decimals).with_type(&dex, "protocol"),
            FeeInfo::new(quote_mint, event.coin_creator_fee as u128, quote_decimals)
                .with_type(&dex, "coinCreator"),
        ];

        Ok(TradeInfo {
            trade_type: get_trade_type(&input_mint, &output_mint),
            input_token: TokenAmount::new(input_mint, input_amount as u128, input_decimals),
            output_token: TokenAmount::new(output_mint, output_amount as u128, output_decimals),
            fee: Some(FeeInfo::new(fee_mint, total_fee, fee_decimals)),
            fees,
            user: event.user,
            program_id: Some(ix.program_id),
            amm: dex,
            route: ctx.dex_info.route.clone(),
            slot: ctx.adapter.slot(),
            timestamp: ctx.adapter.block_time(),
            signature: ctx.adapter.signature(),
            idx,
        })
    }

    fn create_pool_event(
        &self,
        ctx: &ParseContext<'_>,
        ix: &ClassifiedInstruction,
        event: &PumpSwapCreatePoolEvent,
    ) -> PoolEvent {
        let lp_decimals = ctx.adapter.token_decimals(&event.lp_mint).unwrap_or(LP_DECIMALS);
        ctx.pool_event(ix, PoolEventType::Create, event.creator, event.pool)
            .with_token0(
                Some(event.base_mint),
                Some(event.base_amount_in as u128),
                Some(event.base_mint_decimals),
            )
            .with_token1(
                Some(event.quote_mint),
                Some(event.quote_amount_in as u128),
                Some(event.quote_mint_decimals),
            )
            .with_lp(Some(event.lp_mint), Some(event.lp_token_amount_out as u128), lp_decimals)
    }

    fn liquidity_event(
        &self,
        ctx: &ParseContext<'_>,
        ix: &ClassifiedInstruction,
        event_type: PoolEventType,
        event: &PumpSwapLiquidityEvent,
    ) -> PoolEvent {
        let adapter = ctx.adapter;
        let base_mint = adapter.token_account_mint(&event.user_base_token_account);
        let quote_mint = adapter.token_account_mint(&event.user_quote_token_account);
        let lp_mint = adapter.token_account_mint(&event.user_pool_token_account);
        let lp_decimals = lp_mint
            .and_then(|mint| adapter.token_decimals(&mint))
            .unwrap_or(LP_DECIMALS);

        ctx.pool_event(ix, event_type, event.user, event.pool)
            .with_token0(
                base_mint,
                Some(event.base_amount as u128),
                base_mint.and_then(|mint| adapter.token_decimals(&mint)),
            )
            .with_token1(
                quote_mint,
                Some(event.quote_amount as u128),
                quote_mint.and_then(|mint| adapter.token_decimals(&mint)),
            )
            .with_lp(lp_mint, Some(event.lp_token_amount as u128), lp_decimals)
    }
}

impl TradeParser for PumpswapParser {
    fn process_trades(&self, ctx: &ParseContext<'_>) -> Result<Vec<TradeInfo>, ParseError> {
        let mut trades = Vec::new();
        for ix in &ctx.instructions {
            let trade = match parse_event(ix.data(), &ix.idx())? {
                Some(PumpSwapEvent::Buy(event)) => self.build_trade(ctx, ix, Side::Buy, &event)?,
                Some(PumpSwapEvent::Sell(event)) => self.build_trade(ctx, ix, Side::Sell, &event)?,
                _ => continue,
            };
            trades.push(attach_token_transfer_info(trade, ctx.transfers));
        }
        Ok(trades)
    }
}

impl LiquidityParser for PumpswapParser {
    fn process_liquidity(&self, ctx: &ParseContext<'_>) -> Result<Vec<PoolEvent>, ParseError> {
        let mut events = Vec::new();
        for ix in &ctx.instructions {
            match parse_event(ix.data(), &ix.idx())? {
                Some(PumpSwapEvent::CreatePool(event)) => {
                    events.push(self.create_pool_event(ctx, ix, &event))
                }
                Some(PumpSwapEvent::Deposit(event)) => {
                    events.push(self.liquidity_event(ctx, ix, PoolEventType::Add, &event))
                }
                Some(PumpSwapEvent::Withdraw(event)) => {
                    events.push(self.liquidity_event(ctx, ix, PoolEventType::Remove, &event))
                }
                _ => {}
            }
        }
        Ok(events)
    }
}
