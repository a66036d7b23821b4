//! Catalogue records: hardware components, marketplace products and
//! community projects.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::user::UserId;
use super::visibility::{Visibility, VisibilityFilter};
use super::Error;

/// Validation failures for catalogue submissions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogueValidationError {
    /// A required field was missing or blank.
    #[error("{field} is required")]
    Missing {
        /// Wire name of the field.
        field: &'static str,
    },
    /// The component category was not recognised.
    #[error("category must be sensor, actuator, microcontroller, or sbc (got '{0}')")]
    UnknownCategory(String),
    /// The price was not a finite non-negative number.
    #[error("price must be a non-negative number")]
    InvalidPrice,
    /// The steps field was not a JSON array of steps.
    #[error("steps must be a JSON array: {0}")]
    MalformedSteps(String),
    /// A project step had no text.
    #[error("step {step} needs text")]
    EmptyStep {
        /// One-based step number.
        step: usize,
    },
}

impl CatalogueValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::Missing { field } => field,
            Self::UnknownCategory(_) => "category",
            Self::InvalidPrice => "price",
            Self::MalformedSteps(_) | Self::EmptyStep { .. } => "steps",
        }
    }
}

impl From<CatalogueValidationError> for Error {
    fn from(value: CatalogueValidationError) -> Self {
        let field = value.field();
        Self::invalid_request(value.to_string()).with_details(json!({ "field": field }))
    }
}

fn required(value: Option<&String>, field: &'static str) -> Result<String, CatalogueValidationError> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or(CatalogueValidationError::Missing { field })
}

fn optional(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Component category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    /// Input devices.
    Sensor,
    /// Output devices.
    Actuator,
    /// Microcontroller boards.
    Microcontroller,
    /// Single-board computers.
    Sbc,
}

impl ComponentCategory {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::Actuator => "actuator",
            Self::Microcontroller => "microcontroller",
            Self::Sbc => "sbc",
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComponentCategory {
    type Err = CatalogueValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sensor" => Ok(Self::Sensor),
            "actuator" => Ok(Self::Actuator),
            "microcontroller" => Ok(Self::Microcontroller),
            "sbc" => Ok(Self::Sbc),
            _ => Err(CatalogueValidationError::UnknownCategory(s.to_owned())),
        }
    }
}

/// Stored component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    pub name: String,
    pub category: ComponentCategory,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Raw component form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentFields {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Validated component contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSubmission {
    pub name: String,
    pub category: ComponentCategory,
    pub description: String,
}

impl ComponentSubmission {
    /// Validate raw fields. Description is optional.
    pub fn try_from_parts(fields: &ComponentFields) -> Result<Self, CatalogueValidationError> {
        let name = required(fields.name.as_ref(), "name")?;
        let category = required(fields.category.as_ref(), "category")?.parse()?;
        Ok(Self {
            name,
            category,
            description: optional(fields.description.as_ref()).unwrap_or_default(),
        })
    }
}

/// List filter for components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentFilter {
    pub category: Option<ComponentCategory>,
    pub visibility: VisibilityFilter,
}

impl ComponentFilter {
    /// Whether `component` passes every constraint.
    #[must_use]
    pub fn matches(&self, component: &Component) -> bool {
        self.category.is_none_or(|c| c == component.category)
            && self.visibility.matches(&component.visibility)
    }
}

/// Non-negative, finite price.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    /// Validate a numeric price.
    pub fn new(value: f64) -> Result<Self, CatalogueValidationError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(CatalogueValidationError::InvalidPrice)
        }
    }

    /// Parse a textual price as submitted in a form.
    pub fn parse(raw: &str) -> Result<Self, CatalogueValidationError> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| CatalogueValidationError::InvalidPrice)?;
        Self::new(value)
    }

    /// Numeric value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Price {
    type Error = CatalogueValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

/// Stored product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Price,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Raw product fields. `price` stays textual so form and JSON input share a
/// path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFields {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Validated product contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSubmission {
    pub name: String,
    pub price: Price,
    pub description: String,
    /// Externally hosted image supplied instead of an upload.
    pub image_url: Option<String>,
}

impl ProductSubmission {
    /// Validate raw fields.
    pub fn try_from_parts(fields: &ProductFields) -> Result<Self, CatalogueValidationError> {
        let name = required(fields.name.as_ref(), "name")?;
        let price = Price::parse(&required(fields.price.as_ref(), "price")?)?;
        let description = required(fields.description.as_ref(), "description")?;
        Ok(Self {
            name,
            price,
            description,
            image_url: optional(fields.image_url.as_ref()),
        })
    }
}

/// One step of a project walkthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStep {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Comment left on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub author: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Stored project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub steps: Vec<ProjectStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub author: UserId,
    pub likes: u32,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

/// Raw project fields; `steps` is JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub steps: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepInput {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

/// Validated project contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSubmission {
    pub title: String,
    pub description: String,
    pub steps: Vec<ProjectStep>,
}

impl ProjectSubmission {
    /// Validate raw fields. Steps are optional but must be well formed.
    pub fn try_from_parts(fields: &ProjectFields) -> Result<Self, CatalogueValidationError> {
        let title = required(fields.title.as_ref(), "title")?;
        let description = required(fields.description.as_ref(), "description")?;
        let steps = match fields.steps.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Vec::new(),
            Some(text) => serde_json::from_str::<Vec<StepInput>>(text)
                .map_err(|err| CatalogueValidationError::MalformedSteps(err.to_string()))?
                .into_iter()
                .enumerate()
                .map(|(index, step)| {
                    let text = optional(step.text.as_ref())
                        .ok_or(CatalogueValidationError::EmptyStep { step: index + 1 })?;
                    Ok(ProjectStep {
                        text,
                        image_url: optional(step.image_url.as_ref()),
                    })
                })
                .collect::<Result<_, CatalogueValidationError>>()?,
        };
        Ok(Self {
            title,
            description,
            steps,
        })
    }
}
