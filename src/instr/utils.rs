//! 指令解析通用工具函数
//!
//! - discriminator 精确前缀匹配（8 / 16 字节）
//! - 带边界检查的小端整数读取，越界返回 None，不会 panic

use solana_sdk::pubkey::Pubkey;

/// 具名 discriminator：协议内某个指令/事件的固定字节前缀
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discriminator {
    pub name: &'static str,
    pub bytes: &'static [u8],
}

impl Discriminator {
    pub const fn new(name: &'static str, bytes: &'static [u8]) -> Self {
        Self { name, bytes }
    }

    /// 数据前 N 字节与 discriminator 完全相等；数据不足 N 字节视为不匹配
    #[inline]
    pub fn matches(&self, data: &[u8]) -> bool {
        data.get(..self.bytes.len()) == Some(self.bytes)
    }
}

/// 在单个表中按声明顺序查找，首个匹配胜出
#[inline]
pub fn match_discriminator(data: &[u8], table: &[Discriminator]) -> Option<&'static str> {
    table.iter().find(|d| d.matches(data)).map(|d| d.name)
}

/// 按固定顺序依次检查多个分类表，返回 (分类, 名称)
pub fn match_categories<C: Copy>(
    data: &[u8],
    tables: &[(C, &[Discriminator])],
) -> Option<(C, &'static str)> {
    tables
        .iter()
        .find_map(|(category, table)| match_discriminator(data, table).map(|name| (*category, name)))
}

/// 数据是否命中任意一个表
#[inline]
pub fn matches_any(data: &[u8], tables: &[&[Discriminator]]) -> bool {
    tables.iter().any(|table| match_discriminator(data, table).is_some())
}

#[inline(always)]
fn read_array<const N: usize>(data: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    data.get(offset..end)?.try_into().ok()
}

/// 从指令数据中读取 u64（小端序）
#[inline(always)]
pub fn read_u64_le(data: &[u8], offset: usize) -> Option<u64> {
    read_array::<8>(data, offset).map(u64::from_le_bytes)
}

/// 从账户列表中获取账户
#[inline(always)]
pub fn get_account(accounts: &[Pubkey], index: usize) -> Option<Pubkey> {
    accounts.get(index).copied()
}
