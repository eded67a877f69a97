//! Jupiter V6 路由事件解析器
//!
//! Jupiter 每一跳通过 self-CPI 发出一个 SwapEvent（16 字节 discriminator + borsh 事件体）。
//! 同一外层指令下的事件聚合为一笔净交易，多个外层路由再合并为最终交易。

use borsh::BorshDeserialize;
use log::{debug, error};
use solana_sdk::pubkey::Pubkey;
use std::collections::BTreeMap;

use crate::core::adapter::{contains_dca_program, swap_signer};
use crate::core::aggregator::{aggregate_legs, merge_final_swap, NetSwap, SwapLeg};
use crate::core::error::ParseError;
use crate::core::fee::{dca_fee, reconcile_fee};
use crate::core::transfer::{attach_token_transfer_info, get_trade_type};
use crate::core::types::*;
use crate::core::unified_parser::{ParseContext, TradeParser};
use crate::instr::program_ids::{program_name, JUPITER_PROGRAM_ID};
use crate::instr::utils::match_discriminator;

const PROTOCOL: &str = "jupiter";

pub mod discriminators {
    use crate::instr::utils::Discriminator;

    /// SwapEvent 事件 hash
    pub const SWAP_EVENT: [u8; 8] = [64, 198, 205, 232, 38, 8, 113, 226];

    pub const ROUTE_EVENT: [u8; 16] = [
        228, 69, 165, 46, 81, 203, 154, 29, // event CPI tag
        64, 198, 205, 232, 38, 8, 113, 226, // SwapEvent hash
    ];

    pub const EVENTS: &[Discriminator] = &[Discriminator::new("route_event", &ROUTE_EVENT)];
}

/// SwapEvent 事件体
#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub struct SwapEventLayout {
    pub amm: [u8; 32],
    pub input_mint: [u8; 32],
    pub input_amount: u64,
    pub output_mint: [u8; 32],
    pub output_amount: u64,
}

impl SwapEventLayout {
    /// 事件体固定长度
    pub const LEN: usize = 32 * 3 + 8 * 2;
}

#[inline]
pub fn is_route_event(ix: &ClassifiedInstruction) -> bool {
    ix.program_id == JUPITER_PROGRAM_ID && match_discriminator(ix.data(), discriminators::EVENTS).is_some()
}

/// 解码一条路由事件为 swap leg；尾部多余字节忽略
pub fn decode_route_event(
    ctx: &ParseContext<'_>,
    ix: &ClassifiedInstruction,
) -> Result<SwapLeg, ParseError> {
    let mut body = ix
        .data()
        .get(discriminators::ROUTE_EVENT.len()..)
        .ok_or_else(|| ParseError::decode(PROTOCOL, ix.idx(), "route event shorter than discriminator"))?;
    let event = SwapEventLayout::deserialize(&mut body).map_err(|e| {
        error!("jupiter route event decode failed at {}: {}", ix.idx(), e);
        ParseError::decode(PROTOCOL, ix.idx(), e.to_string())
    })?;

    let input_mint = Pubkey::new_from_array(event.input_mint);
    let output_mint = Pubkey::new_from_array(event.output_mint);
    Ok(SwapLeg {
        input_mint,
        output_mint,
        input_amount: event.input_amount as u128,
        output_amount: event.output_amount as u128,
        input_decimals: ctx.adapter.token_decimals(&input_mint).unwrap_or(0),
        output_decimals: ctx.adapter.token_decimals(&output_mint).unwrap_or(0),
        amm: program_name(&Pubkey::new_from_array(event.amm)),
        outer_index: ix.outer_index,
        inner_index: ix.inner_index,
    })
}

pub struct JupiterParser;

impl JupiterParser {
    fn build_trade(&self, ctx: &ParseContext<'_>, net: NetSwap) -> TradeInfo {
        let amm = net
            .amms
            .first()
            .cloned()
            .or_else(|| ctx.dex_info.amm.clone())
            .unwrap_or_default();

        TradeInfo {
            trade_type: get_trade_type(&net.input_mint, &net.output_mint),
            input_token: TokenAmount::new(net.input_mint, net.input_amount, net.input_decimals),
            output_token: TokenAmount::new(net.output_mint, net.output_amount, net.output_decimals),
            fee: None,
            fees: Vec::new(),
            user: swap_signer(ctx.adapter),
            program_id: Some(JUPITER_PROGRAM_ID),
            amm,
            route: Some(
                ctx.dex_info
                    .route
                    .clone()
                    .unwrap_or_else(|| program_name(&JUPITER_PROGRAM_ID)),
            ),
            slot: ctx.adapter.slot(),
            timestamp: ctx.adapter.block_time(),
            signature: ctx.adapter.signature(),
            idx: net.idx,
        }
    }

    /// DCA 固定费率、转账信息、余额校正
    fn finalize(&self, ctx: &ParseContext<'_>, mut trade: TradeInfo) -> TradeInfo {
        if contains_dca_program(ctx.adapter) {
            trade.fee = Some(dca_fee(&trade));
        }
        let mut trade = attach_token_transfer_info(trade, ctx.transfers);
        reconcile_fee(ctx.adapter, &mut trade);
        trade
    }
}

impl TradeParser for JupiterParser {
    fn process_trades(&self, ctx: &ParseContext<'_>) -> Result<Vec<TradeInfo>, ParseError> {
        // 按外层指令分组
        let mut groups: BTreeMap<u32, Vec<SwapLeg>> = BTreeMap::new();
        for ix in ctx.instructions.iter().filter(|ix| is_route_event(ix)) {
            let leg = decode_route_event(ctx, ix)?;
            groups.entry(ix.outer_index).or_default().push(leg);
        }

        let mut trades = Vec::with_capacity(groups.len());
        for (outer_index, legs) in groups {
            match aggregate_legs(&legs)? {
                Some(net) => trades.push(self.build_trade(ctx, net)),
                None => debug!("jupiter route at outer {} produced no trade", outer_index),
            }
        }

        if ctx.config.aggregate_trades {
            let finalized = merge_final_swap(trades)?
                .map(|trade| self.finalize(ctx, trade))
                .into_iter()
                .collect();
            return Ok(finalized);
        }

        Ok(trades.into_iter().map(|trade| self.finalize(ctx, trade)).collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use borsh::BorshSerialize;
    use crate::core::adapter::TxContext;
    use crate::core::config::ParseConfig;
    use crate::instr::program_ids::{tokens, JUPITER_DCA_PROGRAM_ID, ORCA_WHIRLPOOL_PROGRAM_ID};
    use std::collections::HashMap;

    #[derive(BorshSerialize)]
    struct EventBody {
        amm: [u8; 32],
        input_mint: [u8; 32],
        input_amount: u64,
        output_mint: [u8; 32],
        output_amount: u64,
    }

    /// 拼装一条 Jupiter 路由事件指令
    pub(crate) fn route_event(
        outer: u32,
        inner: u32,
        amm: Pubkey,
        input: Pubkey,
        in_amt: u64,
        output: Pubkey,
        out_amt: u64,
    ) -> ClassifiedInstruction {
        let mut data = discriminators::ROUTE_EVENT.to_vec();
        let body = EventBody {
            amm: amm.to_bytes(),
            input_mint: input.to_bytes(),
            input_amount: in_amt,
            output_mint: output.to_bytes(),
            output_amount: out_amt,
        };
        data.extend_from_slice(&borsh::to_vec(&body).unwrap());
        ClassifiedInstruction {
            program_id: JUPITER_PROGRAM_ID,
            instruction: SolanaInstruction {
                program_id: JUPITER_PROGRAM_ID,
                accounts: Vec::new(),
                data,
                inner_instructions: None,
            },
            outer_index: outer,
            inner_index: Some(inner),
        }
    }

    fn run(ctx: &TxContext, config: &ParseConfig, ixs: &[ClassifiedInstruction]) -> Result<Vec<TradeInfo>, ParseError> {
        let transfers = HashMap::new();
        let parse_ctx = ParseContext {
            adapter: ctx,
            instructions: ixs.iter().collect(),
            transfers: &transfers,
            dex_info: DexInfo::default(),
            config,
        };
        JupiterParser.process_trades(&parse_ctx)
    }

    #[test]
    fn test_layout_len() {
        assert_eq!(SwapEventLayout::LEN, 112);
        assert_eq!(&discriminators::ROUTE_EVENT[8..], &discriminators::SWAP_EVENT[..]);
    }

    #[test]
    fn test_multi_hop_route() {
        let user = Pubkey::new_unique();
        let mid = Pubkey::new_unique();
        let out = Pubkey::new_unique();
        let ctx = TxContext::default()
            .with_account_keys(vec![user])
            .with_decimals(mid, 6)
            .with_decimals(out, 5);
        let ixs = vec![
            route_event(1, 2, ORCA_WHIRLPOOL_PROGRAM_ID, tokens::WSOL, 1_000_000_000, mid, 150_000_000),
            route_event(1, 5, Pubkey::new_unique(), mid, 150_000_000, out, 42_000),
        ];

        let trades = run(&ctx, &ParseConfig::default(), &ixs).unwrap();
        assert_eq!(trades.len(), 1);
        let trade = &trades[0];
        assert_eq!(trade.trade_type, TradeType::Buy);
        assert_eq!(trade.input_token.mint, tokens::WSOL);
        assert_eq!(trade.input_token.amount, "1");
        assert_eq!(trade.output_token.mint, out);
        assert_eq!(trade.output_token.amount, "0.42");
        assert_eq!(trade.amm, "Orca");
        assert_eq!(trade.route.as_deref(), Some("Jupiter"));
        assert_eq!(trade.user, user);
        assert_eq!(trade.idx, "1-2");
    }

    #[test]
    fn test_dca_signer_and_fee() {
        let keys: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        let mut account_keys = keys.clone();
        account_keys.push(JUPITER_DCA_PROGRAM_ID);
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        // 余额变化显示收到更少，但 DCA 费用优先
        let ctx = TxContext::default().with_account_keys(account_keys).with_token_change(
            keys[2],
            b,
            BalanceChange { pre: 0, post: 1, change: 1, decimals: 0 },
        );
        let ixs = vec![route_event(0, 1, Pubkey::new_unique(), a, 500, b, 123_456)];

        let trades = run(&ctx, &ParseConfig::default(), &ixs).unwrap();
        assert_eq!(trades[0].user, keys[2]);
        assert_eq!(trades[0].fee.as_ref().unwrap().amount_raw, "123");
        assert_eq!(trades[0].output_token.amount_raw, "123456");
    }

    #[test]
    fn test_disjoint_route_yields_nothing() {
        let ctx = TxContext::default().with_account_keys(vec![Pubkey::new_unique()]);
        let ixs = vec![
            route_event(0, 1, Pubkey::new_unique(), Pubkey::new_unique(), 1, Pubkey::new_unique(), 2),
            route_event(0, 2, Pubkey::new_unique(), Pubkey::new_unique(), 3, Pubkey::new_unique(), 4),
        ];
        assert!(run(&ctx, &ParseConfig::default(), &ixs).unwrap().is_empty());
    }

    #[test]
    fn test_outer_routes_merge_or_stay_separate() {
        let ctx = TxContext::default().with_account_keys(vec![Pubkey::new_unique()]);
        let (a, b, c) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let amm = Pubkey::new_unique();
        let ixs = vec![route_event(0, 1, amm, a, 10, b, 20), route_event(4, 1, amm, b, 20, c, 30)];

        let merged = run(&ctx, &ParseConfig::default(), &ixs).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!((merged[0].input_token.mint, merged[0].output_token.mint), (a, c));
        assert_eq!(merged[0].idx, "0-1");

        let config = ParseConfig {
            aggregate_trades: false,
            ..Default::default()
        };
        let separate = run(&ctx, &config, &ixs).unwrap();
        assert_eq!(separate.len(), 2);
        assert_eq!(separate[1].idx, "4-1");
    }

    #[test]
    fn test_malformed_payload_is_fatal() {
        let ctx = TxContext::default().with_account_keys(vec![Pubkey::new_unique()]);
        let mut ix = route_event(0, 1, Pubkey::new_unique(), Pubkey::new_unique(), 1, Pubkey::new_unique(), 2);
        ix.instruction.data.truncate(16 + 40);
        let err = run(&ctx, &ParseConfig::default(), &[ix]).unwrap_err();
        assert!(matches!(err, ParseError::Decode { protocol: "jupiter", .. }));
    }

    #[test]
    fn test_decode_short_buffer_is_error() {
        let ctx = TxContext::default();
        let transfers = HashMap::new();
        let config = ParseConfig::default();
        let ix = ClassifiedInstruction {
            program_id: JUPITER_PROGRAM_ID,
            instruction: SolanaInstruction {
                program_id: JUPITER_PROGRAM_ID,
                data: vec![228, 69, 165],
                ..Default::default()
            },
            outer_index: 0,
            inner_index: Some(1),
        };
        let parse_ctx = ParseContext {
            adapter: &ctx,
            instructions: vec![&ix],
            transfers: &transfers,
            dex_info: DexInfo::default(),
            config: &config,
        };
        let err = decode_route_event(&parse_ctx, &ix).unwrap_err();
        assert!(matches!(err, ParseError::Decode { protocol: "jupiter", ref idx, .. } if idx == "0-1"));
    }

    #[test]
    fn test_circular_route_not_emitted() {
        let ctx = TxContext::default().with_account_keys(vec![Pubkey::new_unique()]);
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        let amm = Pubkey::new_unique();
        let ixs = vec![route_event(0, 1, amm, a, 100, b, 50), route_event(0, 2, amm, b, 50, a, 105)];
        assert!(run(&ctx, &ParseConfig::default(), &ixs).unwrap().is_empty());
    }

    #[test]
    fn test_short_buffer_not_matched() {
        let ctx = TxContext::default();
        let mut ix = route_event(0, 1, Pubkey::new_unique(), Pubkey::new_unique(), 1, Pubkey::new_unique(), 2);
        ix.instruction.data.truncate(15);
        assert!(!is_route_event(&ix));
        assert!(run(&ctx, &ParseConfig::default(), &[ix]).unwrap().is_empty());
    }
}
