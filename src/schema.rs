//! Field descriptors: the declarative schema each page exposes.
//!
//! A page is a list of base fields plus a list of per-line fields. The
//! renderer and the validator both read the same descriptors, so a field's
//! label, default, and constraints live in exactly one place.

/// How a field is entered and validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// Free-form text.
    Text,
    /// Integer, validated on submit. `min` is inclusive.
    Number { min: i64 },
    /// Date in `YYYY-MM-DD` form. Entry is free-form; only submit validates.
    Date,
    /// One of a fixed set of `(value, label)` options.
    Select { options: &'static [(&'static str, &'static str)] },
}

/// A single field on a page, base-level or per-line.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Key used in form state and storage. Stable across releases.
    pub key: &'static str,
    /// Human-facing label.
    pub label: &'static str,
    pub input: InputType,
    /// Pre-filled value for a fresh form.
    pub default: &'static str,
    /// Whether submit requires a non-empty value.
    pub required: bool,
}

impl FieldDescriptor {
    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            input: InputType::Text,
            default: "",
            required: true,
        }
    }

    pub const fn number(key: &'static str, label: &'static str, min: i64) -> Self {
        Self {
            key,
            label,
            input: InputType::Number { min },
            default: "",
            required: true,
        }
    }

    pub const fn date(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            input: InputType::Date,
            default: "",
            required: true,
        }
    }

    pub const fn select(
        key: &'static str,
        label: &'static str,
        options: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            key,
            label,
            input: InputType::Select { options },
            default: "",
            required: true,
        }
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = default;
        self
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}
