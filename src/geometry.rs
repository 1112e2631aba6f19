//! ピクセル座標上の幾何計算
//!
//! 全関数とも姿勢ランドマークから投影済みのピクセル座標を受け取る
//! 純粋関数で、割り当ても状態も持たない。

/// ピクセル座標上の点
pub type PixelPoint = (i32, i32);

/// 3点のなす角を度数で返す（vertexが頂点、0〜180に折り返し）
/// いずれかの辺が長さ0（点の重複）の場合は角が定義できないためNone
pub fn joint_angle(a: PixelPoint, vertex: PixelPoint, c: PixelPoint) -> Option<f32> {
    let (ax, ay) = ((a.0 - vertex.0) as f32, (a.1 - vertex.1) as f32);
    let (cx, cy) = ((c.0 - vertex.0) as f32, (c.1 - vertex.1) as f32);

    if (ax == 0.0 && ay == 0.0) || (cx == 0.0 && cy == 0.0) {
        return None;
    }

    let mut angle = (f32::atan2(cy, cx) - f32::atan2(ay, ax)).to_degrees().abs();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    Some(angle)
}

/// 2点間のユークリッド距離（ピクセル）
pub fn distance(a: PixelPoint, b: PixelPoint) -> f32 {
    let dx = (b.0 - a.0) as f32;
    let dy = (b.1 - a.1) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// 線分の傾き Δy/Δx
/// 鉛直（Δx=0）は傾きが定義できないためNone
pub fn slope(a: PixelPoint, b: PixelPoint) -> Option<f32> {
    let dx = b.0 - a.0;
    if dx == 0 {
        return None;
    }
    Some((b.1 - a.1) as f32 / dx as f32)
}

/// 2点を結ぶ直線がほぼ鉛直か（水平変位が鉛直変位の2倍以内）
/// 同一点は向きが定義できないためfalse
pub fn is_roughly_vertical(a: PixelPoint, b: PixelPoint) -> bool {
    let dx = (b.0 - a.0).abs();
    let dy = (b.1 - a.1).abs();
    if dx == 0 && dy == 0 {
        return false;
    }
    dx <= 2 * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_angle_straight() {
        // 一直線上の3点は180°
        let angle = joint_angle((0, 0), (100, 0), (200, 0)).unwrap();
        assert!((angle - 180.0).abs() < 0.01, "got {}", angle);
    }

    #[test]
    fn test_joint_angle_right() {
        let angle = joint_angle((0, 0), (0, 100), (100, 100)).unwrap();
        assert!((angle - 90.0).abs() < 0.01, "got {}", angle);
    }

    #[test]
    fn test_joint_angle_reflected_into_half_turn() {
        // atan2差が180°を超える組でも0〜180に折り返される
        let angle = joint_angle((100, -1), (0, 0), (100, 1)).unwrap();
        assert!(angle < 5.0, "got {}", angle);
    }

    #[test]
    fn test_joint_angle_degenerate() {
        assert_eq!(joint_angle((50, 50), (50, 50), (100, 100)), None);
        assert_eq!(joint_angle((0, 0), (100, 100), (100, 100)), None);
    }

    #[test]
    fn test_distance() {
        assert!((distance((0, 0), (3, 4)) - 5.0).abs() < 0.001);
        assert_eq!(distance((7, 7), (7, 7)), 0.0);
    }

    #[test]
    fn test_slope_vertical_is_none() {
        assert_eq!(slope((10, 0), (10, 100)), None);
    }

    #[test]
    fn test_slope_horizontal() {
        assert_eq!(slope((0, 50), (100, 50)), Some(0.0));
    }

    #[test]
    fn test_slope_diagonal() {
        assert_eq!(slope((0, 0), (100, 50)), Some(0.5));
    }

    #[test]
    fn test_roughly_vertical() {
        // 直立（真下）
        assert!(is_roughly_vertical((100, 0), (100, 200)));
        // 多少の水平ずれは許容
        assert!(is_roughly_vertical((100, 0), (180, 200)));
        // 水平変位が鉛直の2倍超は非鉛直
        assert!(!is_roughly_vertical((100, 0), (500, 100)));
        // 水平線
        assert!(!is_roughly_vertical((0, 100), (200, 100)));
        // 同一点
        assert!(!is_roughly_vertical((5, 5), (5, 5)));
    }
}
