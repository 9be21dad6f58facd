//! GREASE 值处理
//!
//! GREASE（Generate Random Extensions And Sustain Extensibility，RFC 8701）
//! 是浏览器随机插入的保留值，用于检测服务器对未知取值的容忍度。指纹比较与
//! 生成都需要先把这些值过滤掉，Synthesizer 在握手时则需要为每个 GREASE 槽
//! 重新挑选一个互不相同的取值。

use rand::seq::SliceRandom;

/// 16 个规范 GREASE 取值：0x?A?A，? 取 0x0..0xF
pub const TLS_GREASE_VALUES: [u16; 16] = [
    0x0A0A, 0x1A1A, 0x2A2A, 0x3A3A, 0x4A4A, 0x5A5A, 0x6A6A, 0x7A7A, 0x8A8A, 0x9A9A, 0xAAAA, 0xBABA,
    0xCACA, 0xDADA, 0xEAEA, 0xFAFA,
];

/// 判断一个数值是否为 GREASE 值（低字节高字节相同且为 `_A`）
pub fn is_grease_value(value: u16) -> bool {
    TLS_GREASE_VALUES.contains(&value)
}

/// 过滤掉列表中的 GREASE 值，保留其余顺序
pub fn filter_grease_values(values: &[u16]) -> Vec<u16> {
    values.iter().copied().filter(|v| !is_grease_value(*v)).collect()
}

/// `filter_grease_values` 的原地版本
pub fn remove_grease_values(values: &mut Vec<u16>) {
    values.retain(|v| !is_grease_value(*v));
}

/// 为 `count` 个 GREASE 槽各自选择一个互不相同的取值（每次握手重新选择）
///
/// 槽位数量永远不会超过 `TLS_GREASE_VALUES` 的长度（ClientHello 里没有哪个
/// 指纹会用到 16 个以上的 GREASE 位置），所以这里直接做不放回抽样。
pub fn pick_distinct_grease_values(count: usize) -> Vec<u16> {
    let mut rng = rand::thread_rng();
    let mut pool = TLS_GREASE_VALUES.to_vec();
    pool.shuffle(&mut rng);
    pool.into_iter().take(count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_all_canonical_values() {
        for v in TLS_GREASE_VALUES {
            assert!(is_grease_value(v));
        }
        assert!(!is_grease_value(0x1301));
    }

    #[test]
    fn filters_preserve_order() {
        let values = vec![0x0a0a, 0x1301, 0x1a1a, 0x1302];
        assert_eq!(filter_grease_values(&values), vec![0x1301, 0x1302]);
    }

    #[test]
    fn distinct_grease_values_are_unique() {
        let picked = pick_distinct_grease_values(4);
        assert_eq!(picked.len(), 4);
        let mut sorted = picked.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 4);
        for v in picked {
            assert!(is_grease_value(v));
        }
    }
}
