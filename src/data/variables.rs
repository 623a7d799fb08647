//! Climate variables shown in the dashboard.

/// The eight forecast parameters, in selector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClimateVariable {
    #[default]
    Tn,
    Tx,
    RhAvg,
    Rr,
    Ss,
    FfX,
    FfAvg,
    DddXSin,
}

impl ClimateVariable {
    pub const ALL: [ClimateVariable; 8] = [
        Self::Tn,
        Self::Tx,
        Self::RhAvg,
        Self::Rr,
        Self::Ss,
        Self::FfX,
        Self::FfAvg,
        Self::DddXSin,
    ];

    /// Column name in the CSV files.
    pub fn key(self) -> &'static str {
        match self {
            Self::Tn => "TN",
            Self::Tx => "TX",
            Self::RhAvg => "RH_AVG",
            Self::Rr => "RR",
            Self::Ss => "SS",
            Self::FfX => "FF_X",
            Self::FfAvg => "FF_AVG",
            Self::DddXSin => "DDD_X_sin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Tn => "Minimum Temperature (TN)",
            Self::Tx => "Maximum Temperature (TX)",
            Self::RhAvg => "Average Relative Humidity (RH_AVG)",
            Self::Rr => "Rainfall (RR)",
            Self::Ss => "Sunshine Duration (SS)",
            Self::FfX => "Maximum Wind Speed (FF_X)",
            Self::FfAvg => "Average Wind Speed (FF_AVG)",
            Self::DddXSin => "Maximum Wind Direction Component (DDD_X_sin)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique_and_labelled() {
        let keys: HashSet<&str> = ClimateVariable::ALL.iter().map(|v| v.key()).collect();
        assert_eq!(keys.len(), ClimateVariable::ALL.len());

        for var in ClimateVariable::ALL {
            assert!(var.label().ends_with(&format!("({})", var.key())));
        }
        assert_eq!(ClimateVariable::default().key(), "TN");
    }
}
