//! Decode Pipeline Benchmarks
//!
//! - Discriminator 分派（命中 / 未命中）
//! - 多跳路由聚合
//! - DexParser 端到端解析（Jupiter 路由 + Raydium 流动性）
//!
//! Run with: cargo bench --bench decode_pipeline

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use sol_trade_parser::core::aggregator::{aggregate_legs, SwapLeg};
use sol_trade_parser::instr::program_ids::*;
use sol_trade_parser::instr::{jupiter, meteora, raydium_clmm};
use sol_trade_parser::{ClassifiedInstruction, DexParser, SolanaInstruction, TransferMap, TxContext};
use solana_sdk::pubkey::Pubkey;

fn classified(
    program_id: Pubkey,
    outer: u32,
    inner: Option<u32>,
    data: Vec<u8>,
    accounts: Vec<Pubkey>,
) -> ClassifiedInstruction {
    ClassifiedInstruction {
        program_id,
        instruction: SolanaInstruction {
            program_id,
            accounts,
            data,
            inner_instructions: None,
        },
        outer_index: outer,
        inner_index: inner,
    }
}

/// 首尾相接的路由：mints[i] → mints[i + 1]
fn route(mints: &[Pubkey]) -> Vec<ClassifiedInstruction> {
    mints
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let mut data = jupiter::discriminators::ROUTE_EVENT.to_vec();
            data.extend_from_slice(&ORCA_WHIRLPOOL_PROGRAM_ID.to_bytes());
            data.extend_from_slice(&pair[0].to_bytes());
            data.extend_from_slice(&(1_000_000u64 * (i as u64 + 1)).to_le_bytes());
            data.extend_from_slice(&pair[1].to_bytes());
            data.extend_from_slice(&(1_000_000u64 * (i as u64 + 2)).to_le_bytes());
            classified(JUPITER_PROGRAM_ID, 0, Some(i as u32 + 1), data, Vec::new())
        })
        .collect()
}

fn legs(mints: &[Pubkey]) -> Vec<SwapLeg> {
    mints
        .windows(2)
        .enumerate()
        .map(|(i, pair)| SwapLeg {
            input_mint: pair[0],
            output_mint: pair[1],
            input_amount: 1_000_000 * (i as u128 + 1),
            output_amount: 1_000_000 * (i as u128 + 2),
            input_decimals: 6,
            output_decimals: 6,
            amm: "Orca".to_string(),
            outer_index: 0,
            inner_index: Some(i as u32 + 1),
        })
        .collect()
}

fn bench_discriminator_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Discriminator Dispatch");

    let mut hit = raydium_clmm::discriminators::DECREASE_LIQUIDITY_V2.to_vec();
    hit.extend_from_slice(&[0u8; 40]);
    let miss = vec![248u8, 198, 158, 145, 225, 117, 135, 200, 0, 0, 0, 0];

    group.bench_function("clmm_hit", |b| {
        b.iter(|| raydium_clmm::get_pool_action(black_box(&hit)))
    });
    group.bench_function("clmm_miss", |b| {
        b.iter(|| raydium_clmm::get_pool_action(black_box(&miss)))
    });
    group.bench_function("meteora_liquidity_miss", |b| {
        b.iter(|| meteora::is_liquidity_instruction(black_box(&miss)))
    });

    group.finish();
}

fn bench_route_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Route Aggregation");

    for hops in [1usize, 2, 4, 8] {
        let mints: Vec<Pubkey> = (0..=hops).map(|_| Pubkey::new_unique()).collect();
        let legs = legs(&mints);
        group.bench_with_input(BenchmarkId::new("aggregate_legs", hops), &legs, |b, legs| {
            b.iter(|| aggregate_legs(black_box(legs)))
        });
    }

    group.finish();
}

fn bench_dex_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("DexParser");

    let user = Pubkey::new_unique();
    let mints = [tokens::WSOL, Pubkey::new_unique(), Pubkey::new_unique(), tokens::USDC];
    let mut instructions = route(&mints);

    let mut increase = raydium_clmm::discriminators::INCREASE_LIQUIDITY.to_vec();
    increase.extend_from_slice(&5_000u128.to_le_bytes());
    increase.extend_from_slice(&100u64.to_le_bytes());
    increase.extend_from_slice(&200u64.to_le_bytes());
    let accounts: Vec<Pubkey> = (0..8).map(|_| Pubkey::new_unique()).collect();
    instructions.push(classified(RAYDIUM_CLMM_PROGRAM_ID, 1, None, increase, accounts));

    let adapter = TxContext::default()
        .with_account_keys(vec![user])
        .with_decimals(tokens::WSOL, 9)
        .with_decimals(tokens::USDC, 6);
    let transfers = TransferMap::new();
    let parser = DexParser::default();

    group.bench_function("parse_trades", |b| {
        b.iter(|| parser.parse_trades(&adapter, black_box(&instructions), &transfers))
    });
    group.bench_function("parse_all", |b| {
        b.iter(|| parser.parse_all(&adapter, black_box(&instructions), &transfers))
    });

    group.finish();
}

criterion_group!(benches, bench_discriminator_dispatch, bench_route_aggregation, bench_dex_parser);

criterion_main!(benches);
