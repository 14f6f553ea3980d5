/// Доля ширины кадра под полосу таймера
pub const BAR_WIDTH_RATIO: f64 = 0.8;
/// Высота полосы в пикселях
pub const BAR_HEIGHT: u32 = 80;
/// Вертикальная позиция полосы относительно высоты кадра
pub const BAR_Y_RATIO: f64 = 0.45;

/// Таймер обратного отсчета: полоса, убывающая слева направо, и цифра секунд
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownTimer {
    pub duration: f64,
    pub bar_x: u32,
    pub bar_y: u32,
    pub bar_width: u32,
    pub bar_height: u32,
}

impl CountdownTimer {
    pub fn new(duration: f64, frame_width: u32, frame_height: u32) -> Self {
        let bar_width = (frame_width as f64 * BAR_WIDTH_RATIO) as u32;
        Self {
            duration,
            bar_x: (frame_width - bar_width) / 2,
            bar_y: (frame_height as f64 * BAR_Y_RATIO) as u32,
            bar_width,
            bar_height: BAR_HEIGHT,
        }
    }

    /// Оставшаяся доля времени в момент `t` от начала таймера
    pub fn remaining_fraction(&self, t: f64) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (1.0 - t / self.duration).clamp(0.0, 1.0)
    }

    /// Ширина заполненной части полосы в пикселях
    pub fn fill_width(&self, t: f64) -> u32 {
        (self.bar_width as f64 * self.remaining_fraction(t)).floor() as u32
    }

    /// Длительность с точностью до миллисекунды, как она попадает в фильтры
    fn rounded_duration(&self) -> f64 {
        (self.duration * 1000.0).round() / 1000.0
    }

    fn max_label(&self) -> u32 {
        self.rounded_duration().ceil().max(1.0) as u32
    }

    /// Цифра на таймере в момент `t`: целые секунды, оставшиеся до конца, с округлением вверх
    pub fn label(&self, t: f64) -> u32 {
        let max = self.max_label();
        let elapsed = t.max(0.0).floor() as u32;
        max.saturating_sub(elapsed).clamp(1, max)
    }

    /// Интервалы `[from, to)` показа каждой цифры
    pub fn label_windows(&self) -> Vec<(u32, f64, f64)> {
        let max = self.max_label();
        let duration = self.rounded_duration();
        (0..max)
            .map(|k| {
                let from = k as f64;
                let to = ((k + 1) as f64).min(duration);
                (max - k, from, to)
            })
            .filter(|(_, from, to)| to > from)
            .collect()
    }

    /// Выражение x заливки внутри полосы для overlay с `eval=frame`.
    ///
    /// Заливка уезжает влево на долю прошедшего времени и обрезается краем полосы.
    /// `start` - абсолютное начало таймера.
    pub fn fill_offset_expr(&self, start: f64) -> String {
        format!(
            "min(0,max(-{w},-{w}*(t-{:.3})/{:.3}))",
            start,
            self.rounded_duration(),
            w = self.bar_width
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry() {
        let timer = CountdownTimer::new(3.0, 1080, 1920);
        assert_eq!(timer.bar_width, 864);
        assert_eq!(timer.bar_x, 108);
        assert_eq!(timer.bar_y, 864);
        assert_eq!(timer.bar_height, 80);
    }

    #[test]
    fn test_fill_width_decreases() {
        let timer = CountdownTimer::new(3.0, 1080, 1920);
        assert_eq!(timer.fill_width(0.0), 864);
        assert_eq!(timer.fill_width(1.5), 432);
        assert_eq!(timer.fill_width(3.0), 0);
        assert_eq!(timer.fill_width(10.0), 0);
        assert_eq!(timer.fill_width(-1.0), 864);
    }

    #[test]
    fn test_labels() {
        let timer = CountdownTimer::new(3.0, 1080, 1920);
        assert_eq!(timer.label(0.0), 3);
        assert_eq!(timer.label(0.99), 3);
        assert_eq!(timer.label(1.0), 2);
        assert_eq!(timer.label(2.5), 1);
        assert_eq!(timer.label(5.0), 1);
    }

    #[test]
    fn test_label_windows_fractional_duration() {
        let timer = CountdownTimer::new(2.5, 1080, 1920);
        let windows = timer.label_windows();
        assert_eq!(windows, vec![(3, 0.0, 1.0), (2, 1.0, 2.0), (1, 2.0, 2.5)]);
    }

    #[test]
    fn test_fill_offset_expr_depends_on_time() {
        let timer = CountdownTimer::new(3.0, 1080, 1920);
        assert_eq!(
            timer.fill_offset_expr(4.5),
            "min(0,max(-864,-864*(t-4.500)/3.000))"
        );
    }

    #[test]
    fn test_float_noise_does_not_add_a_second() {
        let timer = CountdownTimer::new(3.0000000000000018, 1080, 1920);
        assert_eq!(timer.label(0.0), 3);
        assert_eq!(timer.label_windows(), vec![(3, 0.0, 1.0), (2, 1.0, 2.0), (1, 2.0, 3.0)]);
        assert!(timer.fill_offset_expr(0.0).ends_with("/3.000))"));
    }
}
