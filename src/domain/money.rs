use {
    super::error::PipelineError,
    rust_decimal::{Decimal, RoundingStrategy},
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Provider-side amount in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyAmount(i64);

impl MoneyAmount {
    pub fn new(cents: i64) -> Result<Self, PipelineError> {
        if cents < 0 {
            return Err(PipelineError::Validation(format!(
                "MoneyAmount cannot be negative, got: {cents}"
            )));
        }
        Ok(Self(cents))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn to_major(self) -> MajorAmount {
        MajorAmount(Decimal::new(self.0, 2))
    }
}

impl fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored amount in major units, always two decimal places and never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MajorAmount(Decimal);

impl MajorAmount {
    pub fn new(value: Decimal) -> Result<Self, PipelineError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(PipelineError::Validation(format!(
                "amount cannot be negative, got: {value}"
            )));
        }
        let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        Ok(Self(rounded))
    }

    pub fn zero() -> Self {
        MoneyAmount::zero().to_major()
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for MajorAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::str::FromStr};

    #[test]
    fn minor_units_become_major() {
        let amount = MoneyAmount::new(1999).unwrap().to_major();
        assert_eq!(amount.value(), Decimal::from_str("19.99").unwrap());
        assert_eq!(amount.to_string(), "19.99");
    }

    #[test]
    fn negative_minor_rejected() {
        assert!(MoneyAmount::new(-1).is_err());
    }

    #[test]
    fn major_amount_rescales() {
        let a = MajorAmount::new(Decimal::from_str("5").unwrap()).unwrap();
        assert_eq!(a.to_string(), "5.00");
        let b = MajorAmount::new(Decimal::from_str("10.005").unwrap()).unwrap();
        assert_eq!(b.to_string(), "10.01");
        assert!(MajorAmount::new(Decimal::from_str("-0.5").unwrap()).is_err());
    }
}
