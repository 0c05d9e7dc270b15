use crate::contract::OptionContract;
use crate::errors::PricerError;
use crate::models::path::SimulatedPath;
use crate::models::PayoffEvaluator;
use std::str::FromStr;

/// Payoff direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Floored payoff of `measure` against `strike`.
    #[inline]
    pub fn intrinsic(&self, measure: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (measure - strike).max(0.0),
            OptionType::Put => (strike - measure).max(0.0),
        }
    }
}

/// Which summary of the path feeds the strike comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionStyle {
    /// Terminal price.
    European,
    /// Arithmetic average over the whole path.
    Asian,
    /// Running maximum for calls, running minimum for puts.
    Lookback,
}

impl OptionStyle {
    #[inline]
    pub fn path_measure(&self, option_type: OptionType, path: &SimulatedPath) -> f64 {
        match (self, option_type) {
            (OptionStyle::European, _) => path.last(),
            (OptionStyle::Asian, _) => path.mean(),
            (OptionStyle::Lookback, OptionType::Call) => path.max(),
            (OptionStyle::Lookback, OptionType::Put) => path.min(),
        }
    }
}

/// One of the six supported contract shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PayoffVariant {
    pub style: OptionStyle,
    pub option_type: OptionType,
}

impl PayoffVariant {
    pub const EUROPEAN_CALL: Self = Self::new(OptionStyle::European, OptionType::Call);
    pub const EUROPEAN_PUT: Self = Self::new(OptionStyle::European, OptionType::Put);
    pub const ASIAN_CALL: Self = Self::new(OptionStyle::Asian, OptionType::Call);
    pub const ASIAN_PUT: Self = Self::new(OptionStyle::Asian, OptionType::Put);
    pub const LOOKBACK_CALL: Self = Self::new(OptionStyle::Lookback, OptionType::Call);
    pub const LOOKBACK_PUT: Self = Self::new(OptionStyle::Lookback, OptionType::Put);

    pub const ALL: [Self; 6] = [
        Self::EUROPEAN_CALL,
        Self::EUROPEAN_PUT,
        Self::ASIAN_CALL,
        Self::ASIAN_PUT,
        Self::LOOKBACK_CALL,
        Self::LOOKBACK_PUT,
    ];

    pub const fn new(style: OptionStyle, option_type: OptionType) -> Self {
        Self { style, option_type }
    }

    /// Undiscounted payoff on a single path.
    #[inline]
    pub fn payoff(&self, path: &SimulatedPath, strike: f64) -> f64 {
        let measure = self.style.path_measure(self.option_type, path);
        self.option_type.intrinsic(measure, strike)
    }
}

impl PayoffEvaluator for PayoffVariant {
    fn name(&self) -> &'static str {
        match (self.style, self.option_type) {
            (OptionStyle::European, OptionType::Call) => "European Call",
            (OptionStyle::European, OptionType::Put) => "European Put",
            (OptionStyle::Asian, OptionType::Call) => "Asian Call",
            (OptionStyle::Asian, OptionType::Put) => "Asian Put",
            (OptionStyle::Lookback, OptionType::Call) => "Lookback Call",
            (OptionStyle::Lookback, OptionType::Put) => "Lookback Put",
        }
    }

    #[inline]
    fn discounted_payoff(&self, path: &SimulatedPath, contract: &OptionContract) -> f64 {
        self.payoff(path, contract.strike()) * contract.discount_factor()
    }
}

impl std::fmt::Display for PayoffVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts "european-call", "Asian Put", "lookback_call", "euro call", ...
impl FromStr for PayoffVariant {
    type Err = PricerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let mut parts = lowered
            .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
            .filter(|p| !p.is_empty());

        let style = match parts.next() {
            Some("european") | Some("euro") => OptionStyle::European,
            Some("asian") => OptionStyle::Asian,
            Some("lookback") => OptionStyle::Lookback,
            _ => return Err(PricerError::UnsupportedVariant(s.to_string())),
        };
        let option_type = match parts.next() {
            Some("call") => OptionType::Call,
            Some("put") => OptionType::Put,
            _ => return Err(PricerError::UnsupportedVariant(s.to_string())),
        };
        if parts.next().is_some() {
            return Err(PricerError::UnsupportedVariant(s.to_string()));
        }

        Ok(Self::new(style, option_type))
    }
}
