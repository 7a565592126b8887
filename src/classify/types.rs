// src/classify/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Disposal bin an item belongs in. The wire form is the upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BinCategory {
    /// Recycle
    Green,
    /// Compost
    Yellow,
    /// Hazard
    Red,
    /// Trash, and the fallback when the model is unsure
    Grey,
}

impl BinCategory {
    pub const ALL: [BinCategory; 4] = [
        BinCategory::Green,
        BinCategory::Yellow,
        BinCategory::Red,
        BinCategory::Grey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BinCategory::Green => "GREEN",
            BinCategory::Yellow => "YELLOW",
            BinCategory::Red => "RED",
            BinCategory::Grey => "GREY",
        }
    }
}

impl fmt::Display for BinCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single classification result. Every field is required on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteAnalysis {
    pub category: BinCategory,
    pub bin_name_en: String,
    pub bin_name_ur: String,
    pub explanation_en: String,
    pub explanation_ur: String,
    pub identified_item: String,
}

/// Wire names of the [`WasteAnalysis`] fields, in schema order.
pub const ANALYSIS_FIELDS: [&str; 6] = [
    "category",
    "binNameEn",
    "binNameUr",
    "explanationEn",
    "explanationUr",
    "identifiedItem",
];
