use rand::Rng;
use rand::seq::index;

/// 从候选池中无放回地等概率抽取 `count` 个元素。
///
/// 基于 `rand::seq::index::sample` (Floyd / 部分 Fisher-Yates):
/// 任意大小为 `count` 的子集被选中的概率相同, 与候选池顺序无关,
/// 同一次抽取不会出现重复; 返回顺序即抽中顺序。
///
/// 随机源只需统计均匀 (线上使用 `rand::thread_rng()`), 不要求密码学安全。
/// `count` 超过候选池大小时按候选池大小截断, 调用方应事先校验。
pub fn pick_winners<'a, T, R>(rng: &mut R, pool: &'a [T], count: usize) -> Vec<&'a T>
where
    R: Rng + ?Sized,
{
    let amount = count.min(pool.len());
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .filter_map(|i| pool.get(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{HashMap, HashSet};

    // 自由度 9, p = 0.001
    const CHI_SQUARE_CRITICAL_DF9: f64 = 27.88;

    fn chi_square(observed: &[u64], expected: f64) -> f64 {
        observed
            .iter()
            .map(|&o| {
                let d = o as f64 - expected;
                d * d / expected
            })
            .sum()
    }

    #[test]
    fn test_pick_returns_distinct_members() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool: Vec<i32> = (0..50).collect();
        for count in [1, 5, 25, 50] {
            let picked = pick_winners(&mut rng, &pool, count);
            assert_eq!(picked.len(), count);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), count);
        }
    }

    #[test]
    fn test_pick_is_capped_by_pool_size() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = ["a", "b"];
        assert_eq!(pick_winners(&mut rng, &pool, 5).len(), 2);
        let empty: [&str; 0] = [];
        assert!(pick_winners(&mut rng, &empty, 1).is_empty());
    }

    #[test]
    fn test_single_pick_is_uniform() {
        let mut rng = StdRng::seed_from_u64(2024);
        let pool: Vec<usize> = (0..10).collect();
        let rounds = 20_000;
        let mut hits = vec![0u64; pool.len()];
        for _ in 0..rounds {
            let picked = pick_winners(&mut rng, &pool, 1);
            hits[*picked[0]] += 1;
        }
        let expected = rounds as f64 / pool.len() as f64;
        let stat = chi_square(&hits, expected);
        assert!(stat < CHI_SQUARE_CRITICAL_DF9, "chi-square {stat} too large");
    }

    #[test]
    fn test_every_pair_is_equally_likely() {
        // C(5, 2) = 10 个子集
        let mut rng = StdRng::seed_from_u64(99);
        let pool: Vec<u8> = (0..5).collect();
        let rounds = 30_000;
        let mut subsets: HashMap<(u8, u8), u64> = HashMap::new();
        for _ in 0..rounds {
            let picked = pick_winners(&mut rng, &pool, 2);
            let (a, b) = (*picked[0], *picked[1]);
            *subsets.entry((a.min(b), a.max(b))).or_default() += 1;
        }
        assert_eq!(subsets.len(), 10);
        let observed: Vec<u64> = subsets.values().copied().collect();
        let stat = chi_square(&observed, rounds as f64 / 10.0);
        assert!(stat < CHI_SQUARE_CRITICAL_DF9, "chi-square {stat} too large");
    }

    #[test]
    fn test_first_position_has_no_order_bias() {
        let mut rng = StdRng::seed_from_u64(5);
        let pool: Vec<usize> = (0..10).collect();
        let rounds = 20_000;
        let mut first = vec![0u64; pool.len()];
        for _ in 0..rounds {
            let picked = pick_winners(&mut rng, &pool, 3);
            first[*picked[0]] += 1;
        }
        let stat = chi_square(&first, rounds as f64 / pool.len() as f64);
        assert!(stat < CHI_SQUARE_CRITICAL_DF9, "chi-square {stat} too large");
    }
}
