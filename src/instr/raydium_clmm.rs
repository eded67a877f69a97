//! Raydium CLMM 流动性指令解析器
//!
//! 建仓、加减流动性的数量直接编码在指令数据里；
//! 两种 openPosition 变体的账户布局与其余建池指令不同。

use crate::core::error::ParseError;
use crate::core::types::{PoolEvent, PoolEventType};
use crate::core::unified_parser::{LiquidityParser, ParseContext};
use crate::instr::raydium_lp::{
    process_pool_liquidity, ParseEventConfig, RaydiumPoolTables, TokenAmountOffsets,
};
use crate::instr::utils::{match_categories, Discriminator};

/// Raydium CLMM 指令 discriminator (8 bytes)
pub mod discriminators {
    use crate::instr::utils::Discriminator;

    pub const OPEN_POSITION: [u8; 8] = [135, 128, 47, 77, 15, 152, 240, 49];
    pub const OPEN_POSITION_V2: [u8; 8] = [77, 184, 74, 214, 112, 86, 241, 199];
    pub const OPEN_POSITION_WITH_TOKEN22_NFT: [u8; 8] = [77, 255, 174, 82, 125, 29, 201, 46];
    pub const CREATE_POOL: [u8; 8] = [233, 146, 209, 142, 207, 104, 64, 188];
    pub const INCREASE_LIQUIDITY: [u8; 8] = [46, 156, 243, 118, 13, 205, 251, 178];
    pub const INCREASE_LIQUIDITY_V2: [u8; 8] = [133, 29, 89, 223, 69, 238, 176, 10];
    pub const DECREASE_LIQUIDITY: [u8; 8] = [160, 38, 208, 111, 104, 91, 44, 1];
    pub const DECREASE_LIQUIDITY_V2: [u8; 8] = [58, 127, 188, 62, 79, 82, 196, 96];

    pub const CREATE: &[Discriminator] = &[
        Discriminator::new("openPosition", &OPEN_POSITION),
        Discriminator::new("openPositionV2", &OPEN_POSITION_V2),
        Discriminator::new("openPositionWithToken22Nft", &OPEN_POSITION_WITH_TOKEN22_NFT),
        Discriminator::new("createPool", &CREATE_POOL),
    ];

    pub const ADD: &[Discriminator] = &[
        Discriminator::new("increaseLiquidity", &INCREASE_LIQUIDITY),
        Discriminator::new("increaseLiquidityV2", &INCREASE_LIQUIDITY_V2),
    ];

    pub const REMOVE: &[Discriminator] = &[
        Discriminator::new("decreaseLiquidity", &DECREASE_LIQUIDITY),
        Discriminator::new("decreaseLiquidityV2", &DECREASE_LIQUIDITY_V2),
    ];
}

const CATEGORIES: &[(PoolEventType, &[Discriminator])] = &[
    (PoolEventType::Create, discriminators::CREATE),
    (PoolEventType::Add, discriminators::ADD),
    (PoolEventType::Remove, discriminators::REMOVE),
];

// liquidity u128 @8, amount_1 @24, amount_0 @32
const LIQUIDITY_OFFSETS: TokenAmountOffsets = TokenAmountOffsets { token0: 32, token1: 24, lp: 8 };

/// 按 CREATE → ADD → REMOVE 顺序匹配，返回类别与指令名
pub fn get_pool_action(data: &[u8]) -> Option<(PoolEventType, &'static str)> {
    match_categories(data, CATEGORIES)
}

/// 类别/指令名 → 账户索引与数据偏移
pub fn get_event_config(event_type: PoolEventType, name: &str) -> ParseEventConfig {
    match event_type {
        PoolEventType::Create => {
            let index = match name {
                "openPosition" | "openPositionV2" => 5,
                _ => 4,
            };
            ParseEventConfig {
                event_type,
                pool_id_index: index,
                lp_mint_index: index,
                token_amount_offsets: None,
            }
        }
        PoolEventType::Add => ParseEventConfig {
            event_type,
            pool_id_index: 2,
            lp_mint_index: 2,
            token_amount_offsets: Some(LIQUIDITY_OFFSETS),
        },
        PoolEventType::Remove => ParseEventConfig {
            event_type,
            pool_id_index: 3,
            lp_mint_index: 3,
            token_amount_offsets: Some(LIQUIDITY_OFFSETS),
        },
    }
}

pub struct RaydiumClmmParser;

impl RaydiumPoolTables for RaydiumClmmParser {
    fn pool_action(&self, data: &[u8]) -> Option<(PoolEventType, &'static str)> {
        get_pool_action(data)
    }

    fn event_config(&self, event_type: PoolEventType, name: &str) -> ParseEventConfig {
        get_event_config(event_type, name)
    }
}

impl LiquidityParser for RaydiumClmmParser {
    fn process_liquidity(&self, ctx: &ParseContext<'_>) -> Result<Vec<PoolEvent>, ParseError> {
        process_pool_liquidity(self, ctx)
    }
}
