use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! choice_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let value = value.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|choice| choice.as_str().eq_ignore_ascii_case(value))
                    .ok_or_else(|| UnknownChoice {
                        field: stringify!($name),
                        value: value.to_string(),
                    })
            }
        }
    };
}

choice_enum!(Gender {
    Male => "Male",
    Female => "Female",
});

choice_enum!(YesNo {
    Yes => "Yes",
    No => "No",
});

choice_enum!(Dependents {
    Zero => "0",
    One => "1",
    Two => "2",
    ThreeOrMore => "3+",
});

choice_enum!(Education {
    Graduate => "Graduate",
    NotGraduate => "Not Graduate",
});

choice_enum!(PropertyArea {
    Urban => "Urban",
    Semiurban => "Semiurban",
    Rural => "Rural",
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} value '{value}'")]
pub struct UnknownChoice {
    pub field: &'static str,
    pub value: String,
}

/// Loan terms offered by the application form, in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanTerm {
    Months360,
    Months180,
    Months120,
    Months60,
}

impl LoanTerm {
    pub const ALL: &'static [LoanTerm] = &[
        LoanTerm::Months360,
        LoanTerm::Months180,
        LoanTerm::Months120,
        LoanTerm::Months60,
    ];

    pub fn months(self) -> u32 {
        match self {
            LoanTerm::Months360 => 360,
            LoanTerm::Months180 => 180,
            LoanTerm::Months120 => 120,
            LoanTerm::Months60 => 60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoanTerm::Months360 => "360 (30 years)",
            LoanTerm::Months180 => "180 (15 years)",
            LoanTerm::Months120 => "120 (10 years)",
            LoanTerm::Months60 => "60 (5 years)",
        }
    }
}

/// Credit history flag as offered by the application form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditHistory {
    Good,
    Poor,
}

impl CreditHistory {
    pub const ALL: &'static [CreditHistory] = &[CreditHistory::Good, CreditHistory::Poor];

    pub fn value(self) -> u8 {
        match self {
            CreditHistory::Good => 1,
            CreditHistory::Poor => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CreditHistory::Good => "Good (1.0)",
            CreditHistory::Poor => "Poor (0.0)",
        }
    }
}

/// A single loan application as sent to `/api/predict`.
///
/// Numeric fields are already coerced; see `client_core::form::FormDraft`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationInput {
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "Married")]
    pub married: YesNo,
    #[serde(rename = "Dependents")]
    pub dependents: Dependents,
    #[serde(rename = "Education")]
    pub education: Education,
    #[serde(rename = "Self_Employed")]
    pub self_employed: YesNo,
    #[serde(rename = "ApplicantIncome")]
    pub applicant_income: f64,
    #[serde(rename = "CoapplicantIncome")]
    pub coapplicant_income: f64,
    #[serde(rename = "LoanAmount")]
    pub loan_amount: f64,
    #[serde(rename = "Loan_Amount_Term")]
    pub loan_amount_term: f64,
    #[serde(rename = "Credit_History")]
    pub credit_history: f64,
    #[serde(rename = "Property_Area")]
    pub property_area: PropertyArea,
}
