// Числовые помощники: все сигналы приводятся к шкале 0-100

/// Добавка к знаменателю, чтобы нулевое среднее не давало деления на ноль
pub const GROWTH_EPSILON: f64 = 0.001;

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Ограничивает значение диапазоном без округления
pub fn bound(value: f64, low: f64, high: f64) -> f64 {
    value.max(low).min(high)
}

pub fn clamp(value: f64, low: f64, high: f64) -> f64 {
    round1(bound(value, low, high))
}

/// Положение значения внутри [min, max] в шкале 0-100, без округления.
/// При `min == max` возвращает нейтральные 50.
pub fn percent_of_range(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 50.0;
    }
    bound((value - min) / (max - min) * 100.0, 0.0, 100.0)
}

/// [`percent_of_range`], округлённый до одного знака
pub fn min_max_normalize(value: f64, min: f64, max: f64) -> f64 {
    round1(percent_of_range(value, min, max))
}

/// Рост текущего значения относительно базового, в процентах
pub fn growth_pct(current: f64, baseline: f64) -> f64 {
    (current - baseline) / (baseline + GROWTH_EPSILON) * 100.0
}
