use serde::{Deserialize, Serialize};

use crate::pose::Pose;
use crate::render::skeleton::{LANDMARK_COLOR, LOW_VISIBILITY_COLOR, SKELETON_CONNECTIONS};

/// 0RGB形式のピクセルバッファ
/// 描画先のキャンバスであり、注釈済みフレームとしてそのまま配信される
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u32>,
}

impl FrameBuffer {
    /// 黒塗りキャンバスを作成
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u32; (width as usize) * (height as usize)],
        }
    }

    /// 既存ピクセルからバッファを作成（長さ不一致はNone）
    pub fn from_data(width: u32, height: u32, data: Vec<u32>) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// データ長が寸法と一致しているか（受信したバッファの検証用）
    pub fn is_consistent(&self) -> bool {
        self.data.len() == (self.width as usize) * (self.height as usize)
    }

    /// 姿勢を描画（骨格線は指定色、関節点は可視性で色分け）
    pub fn draw_pose(&mut self, pose: &Pose, bone_color: u32, visibility_threshold: f32) {
        let w = self.width;
        let h = self.height;

        // 骨格線を描画
        for (start_idx, end_idx) in SKELETON_CONNECTIONS.iter() {
            let start = pose.get(*start_idx);
            let end = pose.get(*end_idx);

            if start.is_visible(visibility_threshold) && end.is_visible(visibility_threshold) {
                let (x1, y1) = start.to_pixel(w, h);
                let (x2, y2) = end.to_pixel(w, h);
                self.draw_line(x1, y1, x2, y2, bone_color);
            }
        }

        // 関節点を描画
        for lm in pose.landmarks.iter() {
            let (px, py) = lm.to_pixel(w, h);
            let color = if lm.is_visible(visibility_threshold) {
                LANDMARK_COLOR
            } else {
                LOW_VISIBILITY_COLOR
            };
            self.draw_circle(px, py, 3, color);
        }
    }

    /// Bresenhamのアルゴリズムで線を描画
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// 円を描画（塗りつぶし）
    fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// ピクセルをセット（境界チェック付き）
    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.data[y as usize * self.width as usize + x as usize] = color;
        }
    }
}
