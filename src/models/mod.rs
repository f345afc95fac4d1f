pub mod direction;
pub mod ratio;
pub mod trade;

pub use direction::Side;
pub use ratio::Ratio;
pub use trade::{is_valid_currency_pair, Trade};

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
