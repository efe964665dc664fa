use crate::entities::prize_entity;

pub const GRAND_PRIZE_COLOR: &str = "#ffd700";

/// 普通奖品未设置颜色时按序号轮换
pub const DEFAULT_COLORS: [&str; 8] = [
    "#ff6b35", "#00d4ff", "#ff00ff", "#00ff88", "#ffd700", "#e91e63", "#9c27b0", "#2196f3",
];

// 视为"未设置"的颜色值
const UNSET_COLORS: [&str; 4] = ["#000000", "#000", "none", "null"];

/// 计算奖品在抽奖页上的展示颜色。
///
/// 奖品自带的有效颜色优先; 否则大奖固定金色, 普通奖按其在分类中的序号轮换默认色。
pub fn color_for(prize: &prize_entity::Model, index_in_category: usize, is_grand: bool) -> String {
    if let Some(color) = prize.color.as_deref().map(str::trim)
        && !color.is_empty()
        && !UNSET_COLORS.contains(&color.to_ascii_lowercase().as_str())
    {
        return color.to_string();
    }

    if is_grand {
        GRAND_PRIZE_COLOR.to_string()
    } else {
        DEFAULT_COLORS[index_in_category % DEFAULT_COLORS.len()].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prize(color: Option<&str>) -> prize_entity::Model {
        prize_entity::Model {
            id: 1,
            name: "Bike".into(),
            description: None,
            color: color.map(str::to_string),
            qr_code: None,
            image_path: None,
            is_grand: false,
            quantity: 1,
            claimed_count: 0,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_own_color_wins_and_is_trimmed() {
        assert_eq!(color_for(&prize(Some(" #123456 ")), 3, false), "#123456");
        assert_eq!(color_for(&prize(Some("#abcdef")), 0, true), "#abcdef");
    }

    #[test]
    fn test_unset_colors_fall_back() {
        for unset in [None, Some(""), Some("   "), Some("#000"), Some("#000000"), Some("NONE"), Some("null")] {
            assert_eq!(color_for(&prize(unset), 0, true), GRAND_PRIZE_COLOR);
            assert_eq!(color_for(&prize(unset), 1, false), "#00d4ff");
        }
    }

    #[test]
    fn test_normal_prizes_cycle_by_index() {
        assert_eq!(color_for(&prize(None), 0, false), "#ff6b35");
        assert_eq!(color_for(&prize(None), 7, false), "#2196f3");
        assert_eq!(color_for(&prize(None), 8, false), "#ff6b35");
        assert_eq!(color_for(&prize(None), 17, false), "#00d4ff");
    }
}
