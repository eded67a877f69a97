//! PumpSwap (Pump AMM) 事件指令解码
//!
//! PumpSwap 通过 self-CPI 发出事件：内层指令数据 = 16 字节 discriminator + 事件体。
//! 事件体按固定布局 borsh 反序列化；命中 discriminator 但长度不足视为结构性错误。

use borsh::BorshDeserialize;
use solana_sdk::pubkey::Pubkey;

use crate::core::error::ParseError;
use crate::instr::utils::match_discriminator;

const PROTOCOL: &str = "pumpswap";

/// PumpSwap inner instruction discriminators (16 bytes)
/// Format: [event_magic (8 bytes) | event_discriminator (8 bytes)]
pub mod discriminators {
    use crate::instr::utils::Discriminator;

    /// Anchor event CPI 公共前缀
    pub const EVENT_TAG: [u8; 8] = [228, 69, 165, 46, 81, 203, 154, 29];

    pub const BUY: [u8; 16] = [
        228, 69, 165, 46, 81, 203, 154, 29,  // magic prefix
        103, 244, 82, 31, 44, 245, 119, 119, // BuyEvent hash
    ];

    pub const SELL: [u8; 16] = [
        228, 69, 165, 46, 81, 203, 154, 29, // magic prefix
        62, 47, 55, 10, 165, 3, 220, 42,    // SellEvent hash
    ];

    pub const CREATE_POOL: [u8; 16] = [
        228, 69, 165, 46, 81, 203, 154, 29,   // magic prefix
        177, 49, 12, 210, 160, 118, 167, 116, // CreatePoolEvent hash
    ];

    pub const DEPOSIT: [u8; 16] = [
        228, 69, 165, 46, 81, 203, 154, 29,  // magic prefix
        120, 248, 61, 83, 31, 142, 107, 144, // DepositEvent hash
    ];

    pub const WITHDRAW: [u8; 16] = [
        228, 69, 165, 46, 81, 203, 154, 29, // magic prefix
        22, 9, 133, 26, 160, 44, 71, 192,   // WithdrawEvent hash
    ];

    pub const EVENTS: &[Discriminator] = &[
        Discriminator::new("BUY", &BUY),
        Discriminator::new("SELL", &SELL),
        Discriminator::new("CREATE", &CREATE_POOL),
        Discriminator::new("ADD", &DEPOSIT),
        Discriminator::new("REMOVE", &WITHDRAW),
    ];
}

/// tag + 事件 hash
pub const DISCRIMINATOR_LEN: usize = 16;

/// 事件体长度
pub const TRADE_EVENT_SIZE: usize = 14 * 8 + 7 * 32 + 2 * 8;
pub const CREATE_POOL_EVENT_SIZE: usize = 8 + 2 + 3 * 32 + 2 + 7 * 8 + 1 + 5 * 32;
pub const LIQUIDITY_EVENT_SIZE: usize = 11 * 8 + 5 * 32;

// 线上布局，公钥按原始字节读取
#[derive(BorshDeserialize)]
struct RawTradeEvent {
    timestamp: i64,
    base_amount: u64,
    quote_amount_limit: u64,
    user_base_token_reserves: u64,
    user_quote_token_reserves: u64,
    pool_base_token_reserves: u64,
    pool_quote_token_reserves: u64,
    quote_amount: u64,
    lp_fee_basis_points: u64,
    lp_fee: u64,
    protocol_fee_basis_points: u64,
    protocol_fee: u64,
    quote_amount_with_lp_fee: u64,
    user_quote_amount: u64,
    pool: [u8; 32],
    user: [u8; 32],
    user_base_token_account: [u8; 32],
    user_quote_token_account: [u8; 32],
    protocol_fee_recipient: [u8; 32],
    protocol_fee_recipient_token_account: [u8; 32],
    coin_creator: [u8; 32],
    coin_creator_fee_basis_points: u64,
    coin_creator_fee: u64,
}

#[derive(BorshDeserialize)]
struct RawCreatePoolEvent {
    timestamp: i64,
    index: u16,
    creator: [u8; 32],
    base_mint: [u8; 32],
    quote_mint: [u8; 32],
    base_mint_decimals: u8,
    quote_mint_decimals: u8,
    base_amount_in: u64,
    quote_amount_in: u64,
    pool_base_amount: u64,
    pool_quote_amount: u64,
    minimum_liquidity: u64,
    initial_liquidity: u64,
    lp_token_amount_out: u64,
    pool_bump: u8,
    pool: [u8; 32],
    lp_mint: [u8; 32],
    user_base_token_account: [u8; 32],
    user_quote_token_account: [u8; 32],
    coin_creator: [u8; 32],
}

#[derive(BorshDeserialize)]
struct RawLiquidityEvent {
    timestamp: i64,
    lp_token_amount: u64,
    base_amount_limit: u64,
    quote_amount_limit: u64,
    user_base_token_reserves: u64,
    user_quote_token_reserves: u64,
    pool_base_token_reserves: u64,
    pool_quote_token_reserves: u64,
    base_amount: u64,
    quote_amount: u64,
    lp_mint_supply: u64,
    pool: [u8; 32],
    user: [u8; 32],
    user_base_token_account: [u8; 32],
    user_quote_token_account: [u8; 32],
    user_pool_token_account: [u8; 32],
}

/// Buy / Sell 共用的事件体
///
/// Buy: `base_amount` = base_amount_out, `quote_amount` = quote_amount_in,
/// `user_quote_amount` = user_quote_amount_in；Sell 方向相反。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumpSwapTradeEvent {
    pub timestamp: i64,
    pub base_amount: u64,
    pub quote_amount_limit: u64,
    pub user_base_token_reserves: u64,
    pub user_quote_token_reserves: u64,
    pub pool_base_token_reserves: u64,
    pub pool_quote_token_reserves: u64,
    pub quote_amount: u64,
    pub lp_fee_basis_points: u64,
    pub lp_fee: u64,
    pub protocol_fee_basis_points: u64,
    pub protocol_fee: u64,
    pub quote_amount_with_lp_fee: u64,
    pub user_quote_amount: u64,
    pub pool: Pubkey,
    pub user: Pubkey,
    pub user_base_token_account: Pubkey,
    pub user_quote_token_account: Pubkey,
    pub protocol_fee_recipient: Pubkey,
    pub protocol_fee_recipient_token_account: Pubkey,
    pub coin_creator: Pubkey,
    pub coin_creator_fee_basis_points: u64,
    pub coin_creator_fee: u64,
}

impl From<RawTradeEvent> for PumpSwapTradeEvent {
    fn from(raw: RawTradeEvent) -> Self {
        Self {
            timestamp: raw.timestamp,
            base_amount: raw.base_amount,
            quote_amount_limit: raw.quote_amount_limit,
            user_base_token_reserves: raw.user_base_token_reserves,
            user_quote_token_reserves: raw.user_quote_token_reserves,
            pool_base_token_reserves: raw.pool_base_token_reserves,
            pool_quote_token_reserves: raw.pool_quote_token_reserves,
            quote_amount: raw.quote_amount,
            lp_fee_basis_points: raw.lp_fee_basis_points,
            lp_fee: raw.lp_fee,
            protocol_fee_basis_points: raw.protocol_fee_basis_points,
            protocol_fee: raw.protocol_fee,
            quote_amount_with_lp_fee: raw.quote_amount_with_lp_fee,
            user_quote_amount: raw.user_quote_amount,
            pool: Pubkey::new_from_array(raw.pool),
            user: Pubkey::new_from_array(raw.user),
            user_base_token_account: Pubkey::new_from_array(raw.user_base_token_account),
            user_quote_token_account: Pubkey::new_from_array(raw.user_quote_token_account),
            protocol_fee_recipient: Pubkey::new_from_array(raw.protocol_fee_recipient),
            protocol_fee_recipient_token_account: Pubkey::new_from_array(
                raw.protocol_fee_recipient_token_account,
            ),
            coin_creator: Pubkey::new_from_array(raw.coin_creator),
            coin_creator_fee_basis_points: raw.coin_creator_fee_basis_points,
            coin_creator_fee: raw.coin_creator_fee,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumpSwapCreatePoolEvent {
    pub timestamp: i64,
    pub index: u16,
    pub creator: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub base_mint_decimals: u8,
    pub quote_mint_decimals: u8,
    pub base_amount_in: u64,
    pub quote_amount_in: u64,
    pub pool_base_amount: u64,
    pub pool_quote_amount: u64,
    pub minimum_liquidity: u64,
    pub initial_liquidity: u64,
    pub lp_token_amount_out: u64,
    pub pool_bump: u8,
    pub pool: Pubkey,
    pub lp_mint: Pubkey,
    pub user_base_token_account: Pubkey,
    pub user_quote_token_account: Pubkey,
    pub coin_creator: Pubkey,
}

impl From<RawCreatePoolEvent> for PumpSwapCreatePoolEvent {
    fn from(raw: RawCreatePoolEvent) -> Self {
        Self {
            timestamp: raw.timestamp,
            index: raw.index,
            creator: Pubkey::new_from_array(raw.creator),
            base_mint: Pubkey::new_from_array(raw.base_mint),
            quote_mint: Pubkey::new_from_array(raw.quote_mint),
            base_mint_decimals: raw.base_mint_decimals,
            quote_mint_decimals: raw.quote_mint_decimals,
            base_amount_in: raw.base_amount_in,
            quote_amount_in: raw.quote_amount_in,
            pool_base_amount: raw.pool_base_amount,
            pool_quote_amount: raw.pool_quote_amount,
            minimum_liquidity: raw.minimum_liquidity,
            initial_liquidity: raw.initial_liquidity,
            lp_token_amount_out: raw.lp_token_amount_out,
            pool_bump: raw.pool_bump,
            pool: Pubkey::new_from_array(raw.pool),
            lp_mint: Pubkey::new_from_array(raw.lp_mint),
            user_base_token_account: Pubkey::new_from_array(raw.user_base_token_account),
            user_quote_token_account: Pubkey::new_from_array(raw.user_quote_token_account),
            coin_creator: Pubkey::new_from_array(raw.coin_creator),
        }
    }
}

/// Deposit / Withdraw 共用的事件体
///
/// Deposit: `lp_token_amount` 为铸造量，`base_amount`/`quote_amount` 为存入量；
/// Withdraw: `lp_token_amount` 为销毁量，`base_amount`/`quote_amount` 为取出量。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumpSwapLiquidityEvent {
    pub timestamp: i64,
    pub lp_token_amount: u64,
    pub base_amount_limit: u64,
    pub quote_amount_limit: u64,
    pub user_base_token_reserves: u64,
    pub user_quote_token_reserves: u64,
    pub pool_base_token_reserves: u64,
    pub pool_quote_token_reserves: u64,
    pub base_amount: u64,
    pub quote_amount: u64,
    pub lp_mint_supply: u64,
    pub pool: Pubkey,
    pub user: Pubkey,
    pub user_base_token_account: Pubkey,
    pub user_quote_token_account: Pubkey,
    pub user_pool_token_account: Pubkey,
}

impl From<RawLiquidityEvent> for PumpSwapLiquidityEvent {
    fn from(raw: RawLiquidityEvent) -> Self {
        Self {
            timestamp: raw.timestamp,
            lp_token_amount: raw.lp_token_amount,
            base_amount_limit: raw.base_amount_limit,
            quote_amount_limit: raw.quote_amount_limit,
            user_base_token_reserves: raw.user_base_token_reserves,
            user_quote_token_reserves: raw.user_quote_token_reserves,
            pool_base_token_reserves: raw.pool_base_token_reserves,
            pool_quote_token_reserves: raw.pool_quote_token_reserves,
            base_amount: raw.base_amount,
            quote_amount: raw.quote_amount,
            lp_mint_supply: raw.lp_mint_supply,
            pool: Pubkey::new_from_array(raw.pool),
            user: Pubkey::new_from_array(raw.user),
            user_base_token_account: Pubkey::new_from_array(raw.user_base_token_account),
            user_quote_token_account: Pubkey::new_from_array(raw.user_quote_token_account),
            user_pool_token_account: Pubkey::new_from_array(raw.user_pool_token_account),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpSwapEvent {
    Buy(PumpSwapTradeEvent),
    Sell(PumpSwapTradeEvent),
    CreatePool(PumpSwapCreatePoolEvent),
    Deposit(PumpSwapLiquidityEvent),
    Withdraw(PumpSwapLiquidityEvent),
}

/// 读取固定长度事件体；尾部多余字段（新版本追加）忽略
fn decode_body<T: BorshDeserialize>(body: &[u8], size: usize, event: &str, idx: &str) -> Result<T, ParseError> {
    let bytes = body.get(..size).ok_or_else(|| {
        ParseError::decode(
            PROTOCOL,
            idx,
            format!("{} body too short: {} < {}", event, body.len(), size),
        )
    })?;
    borsh::from_slice::<T>(bytes)
        .map_err(|e| ParseError::decode(PROTOCOL, idx, format!("{}: {}", event, e)))
}

/// 解析 PumpSwap 事件指令
///
/// 未命中 discriminator 返回 `Ok(None)`；命中但事件体无法解码返回错误。
pub fn parse_event(data: &[u8], idx: &str) -> Result<Option<PumpSwapEvent>, ParseError> {
    let name = match match_discriminator(data, discriminators::EVENTS) {
        Some(name) => name,
        None => return Ok(None),
    };
    let body = data
        .get(DISCRIMINATOR_LEN..)
        .ok_or_else(|| ParseError::decode(PROTOCOL, idx, "event shorter than discriminator"))?;

    let event = match name {
        "BUY" => PumpSwapEvent::Buy(
            decode_body::<RawTradeEvent>(body, TRADE_EVENT_SIZE, "BuyEvent", idx)?.into(),
        ),
        "SELL" => PumpSwapEvent::Sell(
            decode_body::<RawTradeEvent>(body, TRADE_EVENT_SIZE, "SellEvent", idx)?.into(),
        ),
        "CREATE" => PumpSwapEvent::CreatePool(
            decode_body::<RawCreatePoolEvent>(body, CREATE_POOL_EVENT_SIZE, "CreatePoolEvent", idx)?
                .into(),
        ),
        "ADD" => PumpSwapEvent::Deposit(
            decode_body::<RawLiquidityEvent>(body, LIQUIDITY_EVENT_SIZE, "DepositEvent", idx)?.into(),
        ),
        _ => PumpSwapEvent::Withdraw(
            decode_body::<RawLiquidityEvent>(body, LIQUIDITY_EVENT_SIZE, "WithdrawEvent", idx)?
                .into(),
        ),
    };
    Ok(Some(event))
}

/// 是否为 PumpSwap 事件指令（不解码事件体）
#[inline]
pub fn is_event_instruction(data: &[u8]) -> bool {
    match_discriminator(data, discriminators::EVENTS).is_some()
}
