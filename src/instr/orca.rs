//! Orca Whirlpool swap 解析器
//!
//! 与 Meteora 相同：swap 由转账推导，建池和加减流动性指令排除在外。

use crate::core::error::ParseError;
use crate::core::transfer::process_transfer_swaps;
use crate::core::types::TradeInfo;
use crate::core::unified_parser::{ParseContext, TradeParser};
use crate::instr::utils::match_discriminator;

/// Orca Whirlpool 流动性指令 discriminator (8 bytes)
pub mod discriminators {
    use crate::instr::utils::Discriminator;

    pub const INITIALIZE_POOL: [u8; 8] = [95, 180, 10, 172, 84, 174, 232, 40];
    pub const INITIALIZE_POOL_V2: [u8; 8] = [207, 45, 87, 242, 27, 63, 204, 67];
    pub const INCREASE_LIQUIDITY: [u8; 8] = [46, 156, 243, 118, 13, 205, 251, 178];
    pub const INCREASE_LIQUIDITY_V2: [u8; 8] = [133, 29, 89, 223, 69, 238, 176, 10];
    pub const DECREASE_LIQUIDITY: [u8; 8] = [160, 38, 208, 111, 104, 91, 44, 1];
    pub const DECREASE_LIQUIDITY_V2: [u8; 8] = [58, 127, 188, 62, 79, 82, 196, 96];

    pub const LIQUIDITY: &[Discriminator] = &[
        Discriminator::new("initialize_pool", &INITIALIZE_POOL),
        Discriminator::new("initialize_pool_v2", &INITIALIZE_POOL_V2),
        Discriminator::new("increase_liquidity", &INCREASE_LIQUIDITY),
        Discriminator::new("increase_liquidity_v2", &INCREASE_LIQUIDITY_V2),
        Discriminator::new("decrease_liquidity", &DECREASE_LIQUIDITY),
        Discriminator::new("decrease_liquidity_v2", &DECREASE_LIQUIDITY_V2),
    ];
}

pub fn is_liquidity_instruction(data: &[u8]) -> bool {
    match_discriminator(data, discriminators::LIQUIDITY).is_some()
}

pub struct OrcaParser;

impl TradeParser for OrcaParser {
    fn process_trades(&self, ctx: &ParseContext<'_>) -> Result<Vec<TradeInfo>, ParseError> {
        process_transfer_swaps(ctx, is_liquidity_instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::adapter::TxContext;
    use crate::core::config::ParseConfig;
    use crate::core::transfer::tests::transfer;
    use crate::core::types::*;
    use crate::instr::program_ids::{tokens, ORCA_WHIRLPOOL_PROGRAM_ID};
    use solana_sdk::pubkey::Pubkey;
    use std::collections::HashMap;

    fn ix(outer: u32, data: Vec<u8>) -> ClassifiedInstruction {
        ClassifiedInstruction {
            program_id: ORCA_WHIRLPOOL_PROGRAM_ID,
            instruction: SolanaInstruction {
                program_id: ORCA_WHIRLPOOL_PROGRAM_ID,
                data,
                ..Default::default()
            },
            outer_index: outer,
            inner_index: None,
        }
    }

    #[test]
    fn test_liquidity_excluded_even_with_transfers() {
        let user = Pubkey::new_unique();
        let token = Pubkey::new_unique();
        let (u1, u2, v1, v2) =
            (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());

        let mut increase = discriminators::INCREASE_LIQUIDITY_V2.to_vec();
        increase.extend_from_slice(&[0u8; 32]);
        let increase = ix(0, increase);
        // 无 payload 的指令视为 swap 候选
        let swap = ix(1, Vec::new());
        // 只有一笔转账，证据不足
        let lonely = ix(2, vec![1, 2, 3]);

        let mut transfers: TransferMap = HashMap::new();
        for target in [&increase, &swap] {
            let key = target.key();
            transfers.insert(
                key,
                vec![
                    transfer(&key, 0, tokens::WSOL, u1, v1, Some(user), 500_000_000, 9),
                    transfer(&key, 1, token, v2, u2, Some(v2), 77, 0),
                ],
            );
        }
        let key = lonely.key();
        transfers.insert(key, vec![transfer(&key, 0, token, v2, u2, None, 1, 0)]);

        let adapter = TxContext::default().with_account_keys(vec![user]);
        let config = ParseConfig::default();
        let ctx = ParseContext {
            adapter: &adapter,
            instructions: vec![&increase, &swap, &lonely],
            transfers: &transfers,
            dex_info: DexInfo::default(),
            config: &config,
        };

        let trades = OrcaParser.process_trades(&ctx).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].idx, "1-0");
        assert_eq!(trades[0].trade_type, TradeType::Buy);
        assert_eq!(trades[0].input_token.amount, "0.5");
        assert_eq!(trades[0].amm, "Orca");
    }
}
