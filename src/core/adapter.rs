//! 交易适配器
//!
//! 解析器只通过 [`TransactionAdapter`] 读取交易级状态（账户、精度、余额变化、
//! token 账户 → mint 映射）。调用方必须在解析前准备好全部状态，所有查询同步且无副作用。
//! [`TxContext`] 是一个内存实现，适合已经物化好数据的调用方以及测试。

use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::collections::HashMap;

use crate::core::types::BalanceChange;
use crate::instr::program_ids::{tokens, JUPITER_DCA_PROGRAM_ID};

/// SOL / WSOL 精度
pub const NATIVE_DECIMALS: u8 = 9;

pub trait TransactionAdapter {
    fn slot(&self) -> u64;

    fn block_time(&self) -> i64;

    fn signature(&self) -> Signature;

    /// 交易全部账户（含地址表加载的账户）
    fn account_keys(&self) -> &[Pubkey];

    fn account_key(&self, index: usize) -> Option<Pubkey> {
        self.account_keys().get(index).copied()
    }

    fn token_decimals(&self, mint: &Pubkey) -> Option<u8>;

    /// token 账户对应的 mint
    fn token_account_mint(&self, token_account: &Pubkey) -> Option<Pubkey>;

    /// owner 的 SOL 余额变化（已按指令位置过滤）
    fn sol_balance_change(&self, owner: &Pubkey) -> Option<BalanceChange>;

    /// owner 在某个 mint 上的 token 余额变化（已按指令位置过滤）
    fn token_balance_change(&self, owner: &Pubkey, mint: &Pubkey) -> Option<BalanceChange>;

    fn contains_account(&self, key: &Pubkey) -> bool {
        self.account_keys().contains(key)
    }
}

/// 发起 swap 的用户：默认第 0 个账户；交易包含 Jupiter DCA 程序时取第 2 个账户
pub fn swap_signer<A: TransactionAdapter + ?Sized>(adapter: &A) -> Pubkey {
    let index = if contains_dca_program(adapter) { 2 } else { 0 };
    adapter.account_key(index).unwrap_or_default()
}

#[inline]
pub fn contains_dca_program<A: TransactionAdapter + ?Sized>(adapter: &A) -> bool {
    adapter.contains_account(&JUPITER_DCA_PROGRAM_ID)
}

/// 内存交易上下文
#[derive(Debug, Clone, Default)]
pub struct TxContext {
    slot: u64,
    block_time: i64,
    signature: Signature,
    account_keys: Vec<Pubkey>,
    decimals: HashMap<Pubkey, u8>,
    token_accounts: HashMap<Pubkey, Pubkey>,
    sol_changes: HashMap<Pubkey, BalanceChange>,
    token_changes: HashMap<Pubkey, HashMap<Pubkey, BalanceChange>>,
}

impl TxContext {
    pub fn new(signature: Signature, slot: u64, block_time: i64) -> Self {
        Self {
            signature,
            slot,
            block_time,
            ..Default::default()
        }
    }

    pub fn with_account_keys(mut self, keys: Vec<Pubkey>) -> Self {
        self.account_keys = keys;
        self
    }

    pub fn with_decimals(mut self, mint: Pubkey, decimals: u8) -> Self {
        self.decimals.insert(mint, decimals);
        self
    }

    /// 注册 token 账户及其 mint
    pub fn with_token_account(mut self, token_account: Pubkey, mint: Pubkey) -> Self {
        self.token_accounts.insert(token_account, mint);
        self
    }

    pub fn with_sol_change(mut self, owner: Pubkey, change: BalanceChange) -> Self {
        self.sol_changes.insert(owner, change);
        self
    }

    pub fn with_token_change(mut self, owner: Pubkey, mint: Pubkey, change: BalanceChange) -> Self {
        self.token_changes.entry(owner).or_default().insert(mint, change);
        self
    }
}

impl TransactionAdapter for TxContext {
    fn slot(&self) -> u64 {
        self.slot
    }

    fn block_time(&self) -> i64 {
        self.block_time
    }

    fn signature(&self) -> Signature {
        self.signature
    }

    fn account_keys(&self) -> &[Pubkey] {
        &self.account_keys
    }

    fn token_decimals(&self, mint: &Pubkey) -> Option<u8> {
        self.decimals
            .get(mint)
            .copied()
            .or_else(|| tokens::is_native(mint).then_some(NATIVE_DECIMALS))
    }

    fn token_account_mint(&self, token_account: &Pubkey) -> Option<Pubkey> {
        self.token_accounts.get(token_account).copied()
    }

    fn sol_balance_change(&self, owner: &Pubkey) -> Option<BalanceChange> {
        self.sol_changes.get(owner).copied()
    }

    fn token_balance_change(&self, owner: &Pubkey, mint: &Pubkey) -> Option<BalanceChange> {
        self.token_changes.get(owner)?.get(mint).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_signer_default_and_dca() {
        let keys: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();
        let ctx = TxContext::default().with_account_keys(keys.clone());
        assert_eq!(swap_signer(&ctx), keys[0]);

        let mut with_dca = keys.clone();
        with_dca.push(JUPITER_DCA_PROGRAM_ID);
        let ctx = TxContext::default().with_account_keys(with_dca);
        assert_eq!(swap_signer(&ctx), keys[2]);
    }

    #[test]
    fn test_native_decimals_fallback() {
        let mint = Pubkey::new_unique();
        let ctx = TxContext::default().with_decimals(mint, 6);
        assert_eq!(ctx.token_decimals(&mint), Some(6));
        assert_eq!(ctx.token_decimals(&tokens::WSOL), Some(9));
        assert_eq!(ctx.token_decimals(&Pubkey::new_unique()), None);
    }
}
