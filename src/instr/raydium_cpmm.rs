//! Raydium CPMM 流动性指令解析器

use crate::core::error::ParseError;
use crate::core::types::{PoolEvent, PoolEventType};
use crate::core::unified_parser::{LiquidityParser, ParseContext};
use crate::instr::raydium_lp::{
    process_pool_liquidity, ParseEventConfig, RaydiumPoolTables, TokenAmountOffsets,
};
use crate::instr::utils::{match_categories, Discriminator};

/// Raydium CPMM 指令 discriminator (8 bytes)
pub mod discriminators {
    use crate::instr::utils::Discriminator;

    pub const INITIALIZE: [u8; 8] = [175, 175, 109, 31, 13, 152, 155, 237];
    pub const DEPOSIT: [u8; 8] = [242, 35, 198, 137, 82, 225, 242, 182];
    pub const WITHDRAW: [u8; 8] = [183, 18, 70, 156, 148, 109, 161, 34];

    pub const CREATE: &[Discriminator] = &[Discriminator::new("initialize", &INITIALIZE)];
    pub const ADD: &[Discriminator] = &[Discriminator::new("deposit", &DEPOSIT)];
    pub const REMOVE: &[Discriminator] = &[Discriminator::new("withdraw", &WITHDRAW)];
}

const CATEGORIES: &[(PoolEventType, &[Discriminator])] = &[
    (PoolEventType::Create, discriminators::CREATE),
    (PoolEventType::Add, discriminators::ADD),
    (PoolEventType::Remove, discriminators::REMOVE),
];

pub fn get_pool_action(data: &[u8]) -> Option<(PoolEventType, &'static str)> {
    match_categories(data, CATEGORIES)
}

/// 类别 → 账户索引与数据偏移；CPMM 不区分指令名
pub fn get_event_config(event_type: PoolEventType) -> ParseEventConfig {
    match event_type {
        // init_amount_0 @8, init_amount_1 @16
        PoolEventType::Create => ParseEventConfig {
            event_type,
            pool_id_index: 3,
            lp_mint_index: 6,
            token_amount_offsets: Some(TokenAmountOffsets { token0: 8, token1: 16, lp: 0 }),
        },
        // lp_token_amount @8, token_0 @16, token_1 @24
        PoolEventType::Add | PoolEventType::Remove => ParseEventConfig {
            event_type,
            pool_id_index: 2,
            lp_mint_index: 12,
            token_amount_offsets: Some(TokenAmountOffsets { token0: 16, token1: 24, lp: 8 }),
        },
    }
}

pub struct RaydiumCpmmParser;

impl RaydiumPoolTables for RaydiumCpmmParser {
    fn pool_action(&self, data: &[u8]) -> Option<(PoolEventType, &'static str)> {
        get_pool_action(data)
    }

    fn event_config(&self, event_type: PoolEventType, _name: &str) -> ParseEventConfig {
        get_event_config(event_type)
    }
}

impl LiquidityParser for RaydiumCpmmParser {
    fn process_liquidity(&self, ctx: &ParseContext<'_>) -> Result<Vec<PoolEvent>, ParseError> {
        process_pool_liquidity(self, ctx)
    }
}
