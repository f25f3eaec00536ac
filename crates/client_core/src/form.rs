//! Single-application form: field state, numeric coercion, submit lifecycle.

use std::{fmt, str::FromStr};

use shared::{
    domain::{ApplicationInput, Dependents, Education, Gender, PropertyArea, YesNo},
    error::{ApiResult, ClientError},
    protocol::PredictionResult,
};
use tracing::debug;

use crate::{
    inflight::{InFlight, RequestTicket},
    PredictionApi,
};

pub const DEFAULT_INCOME: f64 = 0.0;
pub const DEFAULT_LOAN_AMOUNT: f64 = 0.0;
pub const DEFAULT_LOAN_TERM: f64 = 360.0;
pub const DEFAULT_CREDIT_HISTORY: f64 = 1.0;
pub const ALREADY_SUBMITTING_MESSAGE: &str = "A prediction is already in progress";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Gender,
    Married,
    Dependents,
    Education,
    SelfEmployed,
    ApplicantIncome,
    CoapplicantIncome,
    LoanAmount,
    LoanAmountTerm,
    CreditHistory,
    PropertyArea,
}

impl FormField {
    pub const ALL: &'static [FormField] = &[
        FormField::Gender,
        FormField::Married,
        FormField::Dependents,
        FormField::Education,
        FormField::SelfEmployed,
        FormField::ApplicantIncome,
        FormField::CoapplicantIncome,
        FormField::LoanAmount,
        FormField::LoanAmountTerm,
        FormField::CreditHistory,
        FormField::PropertyArea,
    ];

    pub const REQUIRED: &'static [FormField] =
        &[FormField::ApplicantIncome, FormField::LoanAmount];

    /// Key used by the prediction service.
    pub fn wire_name(self) -> &'static str {
        match self {
            FormField::Gender => "Gender",
            FormField::Married => "Married",
            FormField::Dependents => "Dependents",
            FormField::Education => "Education",
            FormField::SelfEmployed => "Self_Employed",
            FormField::ApplicantIncome => "ApplicantIncome",
            FormField::CoapplicantIncome => "CoapplicantIncome",
            FormField::LoanAmount => "LoanAmount",
            FormField::LoanAmountTerm => "Loan_Amount_Term",
            FormField::CreditHistory => "Credit_History",
            FormField::PropertyArea => "Property_Area",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Gender => "Gender",
            FormField::Married => "Married",
            FormField::Dependents => "Dependents",
            FormField::Education => "Education",
            FormField::SelfEmployed => "Self Employed",
            FormField::ApplicantIncome => "Applicant Income ($)",
            FormField::CoapplicantIncome => "Coapplicant Income ($)",
            FormField::LoanAmount => "Loan Amount ($1000s)",
            FormField::LoanAmountTerm => "Loan Term (months)",
            FormField::CreditHistory => "Credit History",
            FormField::PropertyArea => "Property Area",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for FormField {
    type Err = ClientError;

    /// Accepts the service key with or without underscores (`Self_Employed`,
    /// `self-employed`, `selfemployed`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_key(value);
        FormField::ALL
            .iter()
            .copied()
            .find(|field| normalize_key(field.wire_name()) == wanted)
            .ok_or_else(|| ClientError::validation(format!("unknown form field '{value}'")))
    }
}

fn normalize_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Editable form contents. Numeric fields stay text until submit.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDraft {
    pub gender: Gender,
    pub married: YesNo,
    pub dependents: Dependents,
    pub education: Education,
    pub self_employed: YesNo,
    pub applicant_income: String,
    pub coapplicant_income: String,
    pub loan_amount: String,
    pub loan_amount_term: String,
    pub credit_history: String,
    pub property_area: PropertyArea,
}

impl Default for FormDraft {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            married: YesNo::Yes,
            dependents: Dependents::Zero,
            education: Education::Graduate,
            self_employed: YesNo::No,
            applicant_income: String::new(),
            coapplicant_income: String::new(),
            loan_amount: String::new(),
            loan_amount_term: "360".to_string(),
            credit_history: "1".to_string(),
            property_area: PropertyArea::Urban,
        }
    }
}

impl FormDraft {
    /// Sets one field from user text. Choice fields must name a known option;
    /// numeric fields are stored as typed.
    pub fn set(&mut self, field: FormField, value: &str) -> ApiResult<()> {
        fn choice<T>(value: &str) -> ApiResult<T>
        where
            T: FromStr,
            T::Err: fmt::Display,
        {
            value
                .parse::<T>()
                .map_err(|err| ClientError::validation(err.to_string()))
        }

        match field {
            FormField::Gender => self.gender = choice(value)?,
            FormField::Married => self.married = choice(value)?,
            FormField::Dependents => self.dependents = choice(value)?,
            FormField::Education => self.education = choice(value)?,
            FormField::SelfEmployed => self.self_employed = choice(value)?,
            FormField::PropertyArea => self.property_area = choice(value)?,
            FormField::ApplicantIncome => self.applicant_income = value.to_string(),
            FormField::CoapplicantIncome => self.coapplicant_income = value.to_string(),
            FormField::LoanAmount => self.loan_amount = value.to_string(),
            FormField::LoanAmountTerm => self.loan_amount_term = value.to_string(),
            FormField::CreditHistory => self.credit_history = value.to_string(),
        }
        Ok(())
    }

    /// Raw text of a numeric field; `None` for choice fields.
    pub fn numeric_text(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::ApplicantIncome => Some(self.applicant_income.as_str()),
            FormField::CoapplicantIncome => Some(self.coapplicant_income.as_str()),
            FormField::LoanAmount => Some(self.loan_amount.as_str()),
            FormField::LoanAmountTerm => Some(self.loan_amount_term.as_str()),
            FormField::CreditHistory => Some(self.credit_history.as_str()),
            _ => None,
        }
    }

    pub fn missing_required(&self) -> Vec<FormField> {
        FormField::REQUIRED
            .iter()
            .copied()
            .filter(|field| {
                self.numeric_text(*field)
                    .is_some_and(|text| text.trim().is_empty())
            })
            .collect()
    }

    /// Builds the wire payload. Text that does not parse as a finite number is
    /// replaced by the field default instead of being rejected.
    pub fn to_input(&self) -> ApplicationInput {
        ApplicationInput {
            gender: self.gender,
            married: self.married,
            dependents: self.dependents,
            education: self.education,
            self_employed: self.self_employed,
            applicant_income: coerce_number(&self.applicant_income, DEFAULT_INCOME),
            coapplicant_income: coerce_number(&self.coapplicant_income, DEFAULT_INCOME),
            loan_amount: coerce_number(&self.loan_amount, DEFAULT_LOAN_AMOUNT),
            loan_amount_term: coerce_number(&self.loan_amount_term, DEFAULT_LOAN_TERM),
            credit_history: coerce_number(&self.credit_history, DEFAULT_CREDIT_HISTORY),
            property_area: self.property_area,
        }
    }
}

pub fn coerce_number(text: &str, default: f64) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => default,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FormState {
    #[default]
    Idle,
    Submitting,
    Result(PredictionResult),
    Error(String),
}

#[derive(Debug, Default)]
pub struct FormController {
    pub draft: FormDraft,
    state: FormState,
    validation_message: Option<String>,
    in_flight: InFlight,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_pending()
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match &self.state {
            FormState::Result(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FormState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Local validation feedback; the controller state is left untouched.
    pub fn validation_message(&self) -> Option<&str> {
        self.validation_message.as_deref()
    }

    /// Moves to `Submitting` and hands back the payload to send. Any previous
    /// result or error is cleared first.
    pub fn begin_submit(&mut self) -> ApiResult<(RequestTicket, ApplicationInput)> {
        if self.in_flight.is_pending() {
            return Err(ClientError::validation(ALREADY_SUBMITTING_MESSAGE));
        }

        let missing = self.draft.missing_required();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|field| field.label()).collect();
            let message = format!("Please fill in: {}", names.join(", "));
            self.validation_message = Some(message.clone());
            return Err(ClientError::validation(message));
        }

        let ticket = self
            .in_flight
            .begin()
            .ok_or_else(|| ClientError::validation(ALREADY_SUBMITTING_MESSAGE))?;
        self.validation_message = None;
        self.state = FormState::Submitting;
        let input = self.draft.to_input();
        debug!(ticket = ticket.id(), "loan application submit started");
        Ok((ticket, input))
    }

    /// Applies an outcome; returns false when the ticket is stale.
    pub fn finish(&mut self, ticket: RequestTicket, outcome: ApiResult<PredictionResult>) -> bool {
        if !self.in_flight.settle(ticket) {
            debug!(ticket = ticket.id(), "dropping stale prediction outcome");
            return false;
        }
        self.state = match outcome {
            Ok(result) => FormState::Result(result),
            Err(err) => FormState::Error(err.message),
        };
        true
    }

    pub async fn submit<A>(&mut self, api: &A) -> &FormState
    where
        A: PredictionApi + ?Sized,
    {
        let Ok((ticket, input)) = self.begin_submit() else {
            return &self.state;
        };
        let outcome = api.submit_application(&input).await;
        self.finish(ticket, outcome);
        &self.state
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
