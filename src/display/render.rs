use crate::remote::ScanResponse;
use rust_decimal::{Decimal, RoundingStrategy};

pub const NONE_PLACEHOLDER: &str = "None";
pub const ZERO_PRICE: &str = "0.00";
pub const DEFAULT_STATUS_MESSAGE: &str = "Status updated.";

/// Severity of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Alert class used by HTML front ends
    pub fn css_class(&self) -> &'static str {
        match self {
            Severity::Success => "alert alert-success",
            Severity::Warning => "alert alert-warning",
            Severity::Error => "alert alert-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub severity: Severity,
}

impl StatusLine {
    pub fn new<S: Into<String>>(text: S, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }

    pub fn processing(code: &str) -> Self {
        Self::new(format!("Processing: {}...", code), Severity::Warning)
    }

    pub fn cancelled(code: &str) -> Self {
        Self::new(format!("Cancelled: {} (camera stopped).", code), Severity::Warning)
    }

    pub fn submit_failed(error: &impl std::fmt::Display) -> Self {
        Self::new(
            format!("Error: {}. Check connection or try again.", error),
            Severity::Error,
        )
    }
}

/// The three transaction fields shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFields {
    pub buyer: String,
    pub item: String,
    pub price: String,
}

impl Default for StateFields {
    fn default() -> Self {
        Self {
            buyer: NONE_PLACEHOLDER.to_string(),
            item: NONE_PLACEHOLDER.to_string(),
            price: ZERO_PRICE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResponse {
    pub status: StatusLine,
    pub fields: StateFields,
}

/// Turn a server response into display values
pub fn render(response: &ScanResponse) -> RenderedResponse {
    let text = response
        .message
        .as_deref()
        .filter(|message| !message.is_empty())
        .unwrap_or(DEFAULT_STATUS_MESSAGE);

    let severity = if response.is_success() {
        Severity::Success
    } else {
        Severity::Error
    };

    let fields = match &response.state {
        Some(state) => StateFields {
            buyer: text_or_none(state.buyer_name.as_deref()),
            item: text_or_none(state.item_name.as_deref()),
            price: format_price(state.accumulated_price),
        },
        None => StateFields::default(),
    };

    RenderedResponse {
        status: StatusLine::new(text, severity),
        fields,
    }
}

/// Two-decimal price, `0.00` when absent or zero
///
/// Exact halves round away from zero, so `0.125` shows as `0.13`.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(value) if value.is_finite() && value != 0.0 => {
            match Decimal::from_f64_retain(value) {
                Some(exact) => format!(
                    "{:.2}",
                    exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                ),
                None => format!("{:.2}", value),
            }
        }
        _ => ZERO_PRICE.to_string(),
    }
}

fn text_or_none(value: Option<&str>) -> String {
    match value {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NONE_PLACEHOLDER.to_string(),
    }
}
