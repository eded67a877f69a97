//! 精确金额工具
//!
//! 所有金额以最小单位整数 (u128) 运算，展示值通过字符串缩放得到，不经过浮点。

/// 将原始数量按 decimals 缩放为十进制字符串
///
/// 去掉小数部分末尾的 0；整数部分至少保留一个 `0`。
pub fn to_ui_amount(raw: u128, decimals: u8) -> String {
    let digits = raw.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = decimals))
    };

    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// 解析原始数量字符串
#[inline]
pub fn parse_raw(amount_raw: &str) -> Option<u128> {
    amount_raw.parse().ok()
}

/// 带符号余额变化的绝对值
#[inline]
pub fn abs_change(change: i128) -> u128 {
    change.unsigned_abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_amount_scaling() {
        assert_eq!(to_ui_amount(1_500_000_000, 9), "1.5");
        assert_eq!(to_ui_amount(1, 6), "0.000001");
        assert_eq!(to_ui_amount(0, 9), "0");
        assert_eq!(to_ui_amount(42, 0), "42");
        assert_eq!(to_ui_amount(1_000_000, 6), "1");
        assert_eq!(to_ui_amount(990_000, 6), "0.99");
    }

    #[test]
    fn test_raw_round_trip_full_u64_range() {
        for value in [0u64, 1, 9_007_199_254_740_993, u64::MAX - 1, u64::MAX] {
            let raw = (value as u128).to_string();
            let parsed = parse_raw(&raw).unwrap();
            assert_eq!(parsed.to_string(), raw);
        }
        assert_eq!(to_ui_amount(u64::MAX as u128, 9), "18446744073.709551615");
    }

    #[test]
    fn test_abs_change() {
        assert_eq!(abs_change(-5), 5);
        assert_eq!(abs_change(7), 7);
    }
}
