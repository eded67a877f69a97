//! Meteora (DLMM / Pools / DAMM v2) swap 解析器
//!
//! Meteora 的 swap 没有显式事件，由指令下的转账推导；
//! 流动性管理指令（建池、加减流动性、领取手续费）按 discriminator 排除。

use crate::core::error::ParseError;
use crate::core::transfer::process_transfer_swaps;
use crate::core::types::TradeInfo;
use crate::core::unified_parser::{ParseContext, TradeParser};
use crate::instr::utils::matches_any;

/// Meteora 流动性指令 discriminator (8 bytes)
pub mod discriminators {
    use crate::instr::utils::Discriminator;

    pub mod dlmm {
        use super::Discriminator;

        pub const ADD_LIQUIDITY: &[Discriminator] = &[
            Discriminator::new("add_liquidity", &[181, 157, 89, 67, 143, 182, 52, 72]),
            Discriminator::new("add_liquidity_by_weight", &[28, 140, 238, 99, 231, 162, 21, 149]),
            Discriminator::new("add_liquidity_by_strategy", &[7, 3, 150, 127, 148, 40, 61, 200]),
            Discriminator::new(
                "add_liquidity_by_strategy_one_side",
                &[41, 5, 238, 175, 100, 225, 6, 205],
            ),
            Discriminator::new("add_liquidity_one_side", &[94, 155, 103, 151, 70, 95, 220, 165]),
            Discriminator::new(
                "add_liquidity_one_side_precise",
                &[161, 194, 103, 84, 171, 71, 250, 154],
            ),
            Discriminator::new("add_liquidity2", &[228, 162, 78, 28, 70, 219, 116, 115]),
            Discriminator::new("add_liquidity_by_strategy2", &[3, 221, 149, 218, 111, 141, 118, 213]),
            Discriminator::new(
                "add_liquidity_one_side_precise2",
                &[33, 51, 163, 201, 117, 98, 125, 231],
            ),
        ];

        pub const REMOVE_LIQUIDITY: &[Discriminator] = &[
            Discriminator::new("remove_liquidity", &[80, 85, 209, 72, 24, 206, 177, 108]),
            Discriminator::new("remove_liquidity_by_range", &[26, 82, 102, 152, 240, 74, 105, 26]),
            Discriminator::new("remove_all_liquidity", &[10, 51, 61, 35, 112, 105, 24, 85]),
            Discriminator::new("remove_liquidity2", &[230, 215, 82, 127, 241, 101, 227, 146]),
            Discriminator::new("remove_liquidity_by_range2", &[204, 2, 195, 145, 53, 145, 145, 205]),
            Discriminator::new("claim_fee", &[169, 32, 79, 137, 136, 232, 70, 137]),
            Discriminator::new("claim_fee2", &[112, 191, 101, 171, 28, 144, 127, 187]),
        ];

        pub const CREATE_POOL: &[Discriminator] = &[
            Discriminator::new("initialize_lb_pair", &[45, 154, 237, 210, 221, 15, 166, 92]),
            Discriminator::new("initialize_lb_pair2", &[73, 59, 36, 120, 237, 83, 108, 198]),
            Discriminator::new(
                "initialize_permission_lb_pair",
                &[108, 102, 213, 85, 251, 3, 53, 21],
            ),
            Discriminator::new(
                "initialize_customizable_permissionless_lb_pair",
                &[46, 39, 41, 135, 111, 183, 200, 64],
            ),
            Discriminator::new(
                "initialize_customizable_permissionless_lb_pair2",
                &[243, 73, 129, 126, 51, 19, 241, 107],
            ),
        ];
    }

    pub const POOLS: &[Discriminator] = &[
        Discriminator::new(
            "initialize_permissionless_pool",
            &[118, 173, 41, 157, 173, 72, 97, 103],
        ),
        Discriminator::new(
            "initialize_permissionless_pool_with_fee_tier",
            &[6, 135, 68, 147, 229, 82, 169, 113],
        ),
        Discriminator::new(
            "initialize_permissionless_constant_product_pool_with_config",
            &[7, 166, 138, 171, 206, 171, 236, 244],
        ),
        Discriminator::new(
            "initialize_customizable_permissionless_constant_product_pool",
            &[145, 24, 172, 194, 219, 125, 3, 190],
        ),
        Discriminator::new("add_balance_liquidity", &[168, 227, 50, 62, 189, 171, 84, 176]),
        Discriminator::new("add_imbalance_liquidity", &[79, 35, 122, 84, 173, 15, 93, 191]),
        Discriminator::new("remove_balance_liquidity", &[133, 109, 44, 179, 56, 238, 114, 33]),
        Discriminator::new("remove_liquidity_single_side", &[84, 84, 177, 66, 254, 185, 10, 251]),
        Discriminator::new("bootstrap_liquidity", &[4, 228, 215, 71, 225, 253, 119, 206]),
    ];

    pub const DAMM_V2: &[Discriminator] = &[
        Discriminator::new("initialize_pool", &[95, 180, 10, 172, 84, 174, 232, 40]),
        Discriminator::new("initialize_customizable_pool", &[20, 161, 241, 24, 189, 221, 180, 2]),
        Discriminator::new(
            "initialize_pool_with_dynamic_config",
            &[149, 82, 72, 197, 253, 252, 68, 15],
        ),
        Discriminator::new("add_liquidity", &[181, 157, 89, 67, 143, 182, 52, 72]),
        Discriminator::new("remove_liquidity", &[80, 85, 209, 72, 24, 206, 177, 108]),
        Discriminator::new("remove_all_liquidity", &[10, 51, 61, 35, 112, 105, 24, 85]),
        Discriminator::new("create_position", &[48, 215, 197, 153, 96, 203, 180, 133]),
        Discriminator::new("claim_position_fee", &[180, 38, 154, 17, 133, 33, 162, 211]),
    ];

    /// 全部流动性表，检查顺序固定
    pub const LIQUIDITY: &[&[Discriminator]] = &[
        dlmm::ADD_LIQUIDITY,
        dlmm::REMOVE_LIQUIDITY,
        dlmm::CREATE_POOL,
        POOLS,
        DAMM_V2,
    ];
}

/// 指令是否为任一 Meteora 程序的流动性指令
pub fn is_liquidity_instruction(data: &[u8]) -> bool {
    matches_any(data, discriminators::LIQUIDITY)
}

pub struct MeteoraParser;

impl TradeParser for MeteoraParser {
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
    use crate::instr::program_ids::{METEORA_DAMM_V2_PROGRAM_ID, METEORA_DLMM_PROGRAM_ID};
    use solana_sdk::pubkey::Pubkey;
    use std::collections::HashMap;

    fn ix(program_id: Pubkey, outer: u32, data: Vec<u8>) -> ClassifiedInstruction {
        ClassifiedInstruction {
            program_id,
            instruction: SolanaInstruction {
                program_id,
                data,
                ..Default::default()
            },
            outer_index: outer,
            inner_index: None,
        }
    }

    #[test]
    fn test_liquidity_tables() {
        let mut data = vec![7, 3, 150, 127, 148, 40, 61, 200];
        data.extend_from_slice(&[0u8; 24]);
        assert!(is_liquidity_instruction(&data));
        assert!(is_liquidity_instruction(&[4, 228, 215, 71, 225, 253, 119, 206]));
        assert!(is_liquidity_instruction(&[180, 38, 154, 17, 133, 33, 162, 211]));
        // DLMM swap
        assert!(!is_liquidity_instruction(&[248, 198, 158, 145, 225, 117, 135, 200]));
        assert!(!is_liquidity_instruction(&[]));
        assert!(!is_liquidity_instruction(&[181, 157, 89]));
    }

    #[test]
    fn test_swap_and_liquidity_instructions() {
        let user = Pubkey::new_unique();
        let (user_a, user_b, vault_a, vault_b) =
            (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let (mint_a, mint_b) = (Pubkey::new_unique(), Pubkey::new_unique());

        let swap = ix(METEORA_DLMM_PROGRAM_ID, 0, vec![248, 198, 158, 145, 225, 117, 135, 200]);
        let add = ix(METEORA_DAMM_V2_PROGRAM_ID, 1, vec![181, 157, 89, 67, 143, 182, 52, 72]);

        let mut transfers: TransferMap = HashMap::new();
        for (target, base) in [(&swap, 0u64), (&add, 100)] {
            let key = target.key();
            transfers.insert(
                key,
                vec![
                    transfer(&key, 0, mint_a, user_a, vault_a, Some(user), 1_000 + base, 6),
                    transfer(&key, 1, mint_b, vault_b, user_b, Some(vault_b), 2_000 + base, 6),
                ],
            );
        }

        let adapter = TxContext::default().with_account_keys(vec![user]);
        let config = ParseConfig::default();
        let ctx = ParseContext {
            adapter: &adapter,
            instructions: vec![&swap, &add],
            transfers: &transfers,
            dex_info: DexInfo::default(),
            config: &config,
        };

        let trades = MeteoraParser.process_trades(&ctx).unwrap();
        assert_eq!(trades.len(), 1);
        let trade = &trades[0];
        assert_eq!(trade.amm, "MeteoraDLMM");
        assert_eq!(trade.program_id, Some(METEORA_DLMM_PROGRAM_ID));
        assert_eq!(trade.input_token.mint, mint_a);
        assert_eq!(trade.output_token.amount_raw, "2000");
        assert_eq!(trade.input_token.source, Some(user_a));
        assert_eq!(trade.idx, "0-0");
    }
}
