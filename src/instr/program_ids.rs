//! Centralized Program ID Constants
//!
//! Pubkey constants for every protocol this crate decodes, plus the token
//! constants used for trade-direction classification. Using Pubkey constants
//! instead of strings allows direct comparison without base58 conversion.

use once_cell::sync::Lazy;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

/// Jupiter Aggregator V6 program ID
pub const JUPITER_PROGRAM_ID: Pubkey = pubkey!("JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4");

/// Jupiter DCA program ID
pub const JUPITER_DCA_PROGRAM_ID: Pubkey = pubkey!("DCA265Vj8a9CEuX1eb1LWRnDT7uK6q1xMipnNyatn23M");

/// PumpSwap program ID as Pubkey constant
pub const PUMPSWAP_PROGRAM_ID: Pubkey = pubkey!("pAMMBay6oceH9fJKBRHGP5D4bD4sWpmSwMn52FMfXEA");

/// Raydium CLMM program ID as Pubkey constant
pub const RAYDIUM_CLMM_PROGRAM_ID: Pubkey = pubkey!("CAMMCzo5YL8w4VFF8KVHrK22GGUQpMDdHFWF5LCATdCR");

/// Raydium CPMM program ID as Pubkey constant
pub const RAYDIUM_CPMM_PROGRAM_ID: Pubkey = pubkey!("CPMMoo8L3F4NbTegBCKVNunggL7H1ZpdTHKxQB5qKP1C");

/// Orca Whirlpool program ID as Pubkey constant
pub const ORCA_WHIRLPOOL_PROGRAM_ID: Pubkey =
    pubkey!("whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc");

/// Meteora Pools program ID as Pubkey constant
pub const METEORA_POOLS_PROGRAM_ID: Pubkey =
    pubkey!("Eo7WjKq67rjJQSZxS6z3YkapzY3eMj6Xy8X5EQVn5UaB");

/// Meteora DAMM V2 program ID as Pubkey constant
pub const METEORA_DAMM_V2_PROGRAM_ID: Pubkey =
    pubkey!("cpamdpZCGKUy5JxQXB4dcpGPiikHawvSWAd6mEn1sGG");

/// Meteora DLMM program ID as Pubkey constant
pub const METEORA_DLMM_PROGRAM_ID: Pubkey = pubkey!("LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo");

/// 交易方向判断用到的基础代币
pub mod tokens {
    use solana_sdk::pubkey;
    use solana_sdk::pubkey::Pubkey;

    /// Native SOL (system program address)
    pub const SOL: Pubkey = pubkey!("11111111111111111111111111111111");
    pub const WSOL: Pubkey = pubkey!("So11111111111111111111111111111111111111112");
    pub const USDC: Pubkey = pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
    pub const USDT: Pubkey = pubkey!("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB");

    pub const BASE_TOKENS: [Pubkey; 4] = [SOL, WSOL, USDC, USDT];

    #[inline]
    pub fn is_native(mint: &Pubkey) -> bool {
        *mint == SOL || *mint == WSOL
    }

    #[inline]
    pub fn is_base(mint: &Pubkey) -> bool {
        BASE_TOKENS.contains(mint)
    }
}

static PROGRAM_NAMES: Lazy<HashMap<Pubkey, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (JUPITER_PROGRAM_ID, "Jupiter"),
        (JUPITER_DCA_PROGRAM_ID, "JupiterDCA"),
        (PUMPSWAP_PROGRAM_ID, "Pumpswap"),
        (RAYDIUM_CLMM_PROGRAM_ID, "RaydiumCL"),
        (RAYDIUM_CPMM_PROGRAM_ID, "RaydiumCPMM"),
        (ORCA_WHIRLPOOL_PROGRAM_ID, "Orca"),
        (METEORA_POOLS_PROGRAM_ID, "MeteoraPools"),
        (METEORA_DAMM_V2_PROGRAM_ID, "MeteoraDAMMV2"),
        (METEORA_DLMM_PROGRAM_ID, "MeteoraDLMM"),
    ])
});

/// 协议名称，未知程序返回 base58 地址
pub fn program_name(program_id: &Pubkey) -> String {
    PROGRAM_NAMES
        .get(program_id)
        .map(|name| name.to_string())
        .unwrap_or_else(|| program_id.to_string())
}
