use rust_decimal::Decimal;

pub trait RoundedDisplay {
    /// Two decimal places, banker's rounding.
    fn to_string_rounded(&self) -> String;
}

impl RoundedDisplay for Decimal {
    fn to_string_rounded(&self) -> String {
        format!("{:.2}", self.round_dp(2))
    }
}
