//! 费用推导
//!
//! 交易没有显式费用时，用用户实际观察到的余额变化与名义输出量之差作为隐含费用。

use log::debug;

use crate::core::adapter::TransactionAdapter;
use crate::core::amount::abs_change;
use crate::core::types::{BalanceChange, FeeInfo, TradeInfo};
use crate::instr::program_ids::tokens;

/// Jupiter DCA 固定费率：输出量的 0.1%（整数除法截断）
pub const DCA_FEE_DIVISOR: u128 = 1000;

pub fn dca_fee(trade: &TradeInfo) -> FeeInfo {
    let out = &trade.output_token;
    FeeInfo::new(out.mint, out.raw() / DCA_FEE_DIVISOR, out.decimals)
}

fn observed_change<A: TransactionAdapter + ?Sized>(
    adapter: &A,
    trade: &TradeInfo,
    mint: &solana_sdk::pubkey::Pubkey,
) -> Option<BalanceChange> {
    if tokens::is_native(mint) {
        adapter.sol_balance_change(&trade.user)
    } else {
        adapter.token_balance_change(&trade.user, mint)
    }
}

/// 用余额变化校正交易的费用和实际数量
///
/// - 输出侧：无显式费用且名义输出量大于实际到账量时，差值记为费用，输出量改为实际到账量
/// - 输入侧：输入为 SOL、余额减少且扣款（绝对值）大于名义输入量时，输入量改为实际扣款
pub fn reconcile_fee<A: TransactionAdapter + ?Sized>(adapter: &A, trade: &mut TradeInfo) {
    if trade.fee.is_none() {
        let output_mint = trade.output_token.mint;
        if let Some(change) = observed_change(adapter, trade, &output_mint) {
            let nominal = i128::try_from(trade.output_token.raw()).unwrap_or(i128::MAX);
            let fee = nominal.saturating_sub(change.change);
            if fee > 0 && change.change >= 0 {
                debug!("{}: implicit fee {} on {}", trade.idx, fee, output_mint);
                trade.fee = Some(FeeInfo::new(output_mint, fee as u128, trade.output_token.decimals));
                trade.output_token.balance_change = Some(change.change.to_string());
                trade.output_token.set_raw(change.change as u128);
            }
        }
    }

    if tokens::is_native(&trade.input_token.mint) {
        if let Some(change) = adapter
            .sol_balance_change(&trade.user)
            .filter(|change| change.change < 0)
        {
            let debit = abs_change(change.change);
            if debit > trade.input_token.raw() {
                trade.input_token.balance_change = Some(change.change.to_string());
                trade.input_token.set_raw(debit);
            }
        }
    }
}
