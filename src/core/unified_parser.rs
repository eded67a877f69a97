//! 统一解析器 - 单一入口
//!
//! 按程序 ID 把已分类指令分发给各协议解析器，汇总交易和流动性事件。
//!
//! - 指令先按 (outer_index, inner_index) 排序，协议按首次出现的位置依次处理
//! - 交易中出现路由聚合器（Jupiter）且它产出了交易时，只返回聚合器的结果，
//!   避免把被路由的底层 AMM swap 重复计入
//! - 结构性错误默认中止整笔交易；`throw_on_error = false` 时只丢弃出错协议的结果

use log::{debug, error};
use solana_sdk::pubkey::Pubkey;

use crate::core::adapter::TransactionAdapter;
use crate::core::config::ParseConfig;
use crate::core::error::ParseError;
use crate::core::types::*;
use crate::instr::jupiter::JupiterParser;
use crate::instr::meteora::MeteoraParser;
use crate::instr::orca::OrcaParser;
use crate::instr::program_ids::*;
use crate::instr::pump_amm::PumpswapParser;
use crate::instr::raydium_clmm::RaydiumClmmParser;
use crate::instr::raydium_cpmm::RaydiumCpmmParser;

/// 一次协议解析所需的全部上下文
pub struct ParseContext<'a> {
    pub adapter: &'a dyn TransactionAdapter,
    /// 属于该协议的指令，已排序
    pub instructions: Vec<&'a ClassifiedInstruction>,
    pub transfers: &'a TransferMap,
    pub dex_info: DexInfo,
    pub config: &'a ParseConfig,
}

impl ParseContext<'_> {
    /// 预设的 amm 标签，否则使用程序名
    pub fn amm_label(&self, program_id: &Pubkey) -> String {
        self.dex_info
            .amm
            .clone()
            .unwrap_or_else(|| program_name(program_id))
    }

    /// 流动性事件的公共字段
    pub fn pool_event(
        &self,
        ix: &ClassifiedInstruction,
        event_type: PoolEventType,
        user: Pubkey,
        pool_id: Pubkey,
    ) -> PoolEvent {
        PoolEvent {
            user,
            event_type,
            program_id: ix.program_id,
            amm: self.amm_label(&ix.program_id),
            slot: self.adapter.slot(),
            timestamp: self.adapter.block_time(),
            signature: self.adapter.signature(),
            idx: ix.idx(),
            pool_id,
            ..Default::default()
        }
    }

    /// 针对某条指令的 DexInfo
    pub fn dex_info_for(&self, program_id: &Pubkey) -> DexInfo {
        DexInfo {
            program_id: Some(*program_id),
            amm: Some(self.amm_label(program_id)),
            route: self.dex_info.route.clone(),
        }
    }
}

/// 交易解析能力
pub trait TradeParser {
    fn process_trades(&self, ctx: &ParseContext<'_>) -> Result<Vec<TradeInfo>, ParseError>;
}

/// 流动性事件解析能力
pub trait LiquidityParser {
    fn process_liquidity(&self, ctx: &ParseContext<'_>) -> Result<Vec<PoolEvent>, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Jupiter,
    Meteora,
    Orca,
    PumpSwap,
    RaydiumClmm,
    RaydiumCpmm,
}

impl Protocol {
    pub fn from_program_id(program_id: &Pubkey) -> Option<Self> {
        match *program_id {
            JUPITER_PROGRAM_ID => Some(Protocol::Jupiter),
            METEORA_DLMM_PROGRAM_ID | METEORA_POOLS_PROGRAM_ID | METEORA_DAMM_V2_PROGRAM_ID => {
                Some(Protocol::Meteora)
            }
            ORCA_WHIRLPOOL_PROGRAM_ID => Some(Protocol::Orca),
            PUMPSWAP_PROGRAM_ID => Some(Protocol::PumpSwap),
            RAYDIUM_CLMM_PROGRAM_ID => Some(Protocol::RaydiumClmm),
            RAYDIUM_CPMM_PROGRAM_ID => Some(Protocol::RaydiumCpmm),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Protocol::Jupiter => "jupiter",
            Protocol::Meteora => "meteora",
            Protocol::Orca => "orca",
            Protocol::PumpSwap => "pumpswap",
            Protocol::RaydiumClmm => "raydium_clmm",
            Protocol::RaydiumCpmm => "raydium_cpmm",
        }
    }

    fn trade_parser(self) -> Option<&'static dyn TradeParser> {
        match self {
            Protocol::Jupiter => Some(&JupiterParser),
            Protocol::Meteora => Some(&MeteoraParser),
            Protocol::Orca => Some(&OrcaParser),
            Protocol::PumpSwap => Some(&PumpswapParser),
            Protocol::RaydiumClmm | Protocol::RaydiumCpmm => None,
        }
    }

    fn liquidity_parser(self) -> Option<&'static dyn LiquidityParser> {
        match self {
            Protocol::PumpSwap => Some(&PumpswapParser),
            Protocol::RaydiumClmm => Some(&RaydiumClmmParser),
            Protocol::RaydiumCpmm => Some(&RaydiumCpmmParser),
            _ => None,
        }
    }
}

/// DEX 交易解析器
#[derive(Debug, Clone, Default)]
pub struct DexParser {
    config: ParseConfig,
}

impl DexParser {
    pub fn new(config: ParseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// 按协议分组，协议顺序 = 首条指令的位置
    fn group<'a>(
        &self,
        instructions: &'a [ClassifiedInstruction],
    ) -> Vec<(Protocol, Vec<&'a ClassifiedInstruction>)> {
        let mut sorted: Vec<&ClassifiedInstruction> = instructions.iter().collect();
        sorted.sort_by_key(|ix| (ix.outer_index, ix.inner_index.map_or(0, |i| i as u64 + 1)));

        let mut groups: Vec<(Protocol, Vec<&ClassifiedInstruction>)> = Vec::new();
        for ix in sorted {
            if !self.config.should_parse(&ix.program_id) {
                continue;
            }
            let protocol = match Protocol::from_program_id(&ix.program_id) {
                Some(p) => p,
                None => {
                    debug!("no parser for program {} at {}", ix.program_id, ix.idx());
                    continue;
                }
            };
            match groups.iter_mut().find(|(p, _)| *p == protocol) {
                Some((_, list)) => list.push(ix),
                None => groups.push((protocol, vec![ix])),
            }
        }
        groups
    }

    fn context<'a>(
        &'a self,
        adapter: &'a dyn TransactionAdapter,
        instructions: Vec<&'a ClassifiedInstruction>,
        transfers: &'a TransferMap,
    ) -> ParseContext<'a> {
        let program_id = instructions.first().map(|ix| ix.program_id);
        ParseContext {
            adapter,
            instructions,
            transfers,
            dex_info: DexInfo {
                program_id,
                amm: self.config.amm.clone(),
                route: self.config.route.clone(),
            },
            config: &self.config,
        }
    }

    /// 协议级错误处理
    fn guard<T>(&self, protocol: Protocol, result: Result<Vec<T>, ParseError>) -> Result<Vec<T>, ParseError> {
        match result {
            Ok(items) => Ok(items),
            Err(e) if self.config.throw_on_error => {
                error!("{} parse failed: {}", protocol.name(), e);
                Err(e)
            }
            Err(e) => {
                error!("{} parse failed, skipped: {}", protocol.name(), e);
                Ok(Vec::new())
            }
        }
    }

    /// 解析交易中的全部 swap
    pub fn parse_trades<A: TransactionAdapter>(
        &self,
        adapter: &A,
        instructions: &[ClassifiedInstruction],
        transfers: &TransferMap,
    ) -> Result<Vec<TradeInfo>, ParseError> {
        let groups = self.group(instructions);

        if let Some((_, jupiter_ixs)) = groups.iter().find(|(p, _)| *p == Protocol::Jupiter) {
            let ctx = self.context(adapter, jupiter_ixs.clone(), transfers);
            let trades = self.guard(Protocol::Jupiter, JupiterParser.process_trades(&ctx))?;
            if !trades.is_empty() {
                return Ok(trades);
            }
        }

        let mut trades = Vec::new();
        for (protocol, ixs) in groups {
            if protocol == Protocol::Jupiter {
                continue;
            }
            if let Some(parser) = protocol.trade_parser() {
                let ctx = self.context(adapter, ixs, transfers);
                trades.extend(self.guard(protocol, parser.process_trades(&ctx))?);
            }
        }
        trades.sort_by_key(|trade| idx_order(&trade.idx));
        Ok(trades)
    }

    /// 解析交易中的流动性事件
    pub fn parse_liquidity<A: TransactionAdapter>(
        &self,
        adapter: &A,
        instructions: &[ClassifiedInstruction],
        transfers: &TransferMap,
    ) -> Result<Vec<PoolEvent>, ParseError> {
        let mut events = Vec::new();
        for (protocol, ixs) in self.group(instructions) {
            if let Some(parser) = protocol.liquidity_parser() {
                let ctx = self.context(adapter, ixs, transfers);
                events.extend(self.guard(protocol, parser.process_liquidity(&ctx))?);
            }
        }
        events.sort_by_key(|event| idx_order(&event.idx));
        Ok(events)
    }

    /// 交易 + 流动性 + 交易元数据
    pub fn parse_all<A: TransactionAdapter>(
        &self,
        adapter: &A,
        instructions: &[ClassifiedInstruction],
        transfers: &TransferMap,
    ) -> Result<ParseResult, ParseError> {
        Ok(ParseResult {
            slot: adapter.slot(),
            timestamp: adapter.block_time(),
            signature: adapter.signature(),
            trades: self.parse_trades(adapter, instructions, transfers)?,
            liquidities: self.parse_liquidity(adapter, instructions, transfers)?,
        })
    }
}
