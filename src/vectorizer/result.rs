//! The single result type every strategy returns.

use crate::analysis::ImageMetadata;
use crate::core::BBox;
use crate::error::Result;
use crate::params::{ParameterSource, TracingParameters};
use crate::svg::SvgDocument;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// How the SVG text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    PaletteGuided,
    /// Engine output passed through unmodified.
    TracedRaw,
    /// Engine output parsed and refined.
    TracedRefined,
    Contour,
    /// Basic fallback after the engine was unavailable or failed.
    Fallback,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PaletteGuided => "palette_guided",
            Self::TracedRaw => "traced_raw",
            Self::TracedRefined => "traced_refined",
            Self::Contour => "contour",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultMetadata {
    pub num_elements: usize,
    pub content_type: ContentType,
    pub image_metadata: ImageMetadata,
    /// Present when tracing parameters were involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_source: Option<ParameterSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracing_parameters: Option<TracingParameters>,
    /// Why the basic fallback ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gradient_regions: Vec<BBox>,
}

/// Terminal artifact of one conversion.
///
/// Serializes as a summary: the SVG text itself is left out.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    #[serde(skip)]
    pub svg: String,
    /// Wall-clock seconds.
    pub processing_time: f64,
    pub strategy_used: String,
    pub quality_score: f64,
    pub metadata: ResultMetadata,
}

impl ConversionResult {
    pub fn element_count(&self) -> usize {
        self.metadata.num_elements
    }

    /// Write the SVG text to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        crate::svg::write_file(path, &self.svg)
    }
}

/// Document plus how it was made, before timing and scoring.
pub(super) struct Produced {
    pub document: SvgDocument,
    /// Replaces the serialized document when set.
    pub raw: Option<String>,
    pub content_type: ContentType,
    pub strategy_used: String,
    pub parameters: Option<(TracingParameters, ParameterSource)>,
    pub fallback_reason: Option<String>,
    pub gradient_regions: Vec<BBox>,
}

impl Produced {
    pub fn new(document: SvgDocument, content_type: ContentType, strategy_used: &str) -> Self {
        Self {
            document,
            raw: None,
            content_type,
            strategy_used: strategy_used.to_string(),
            parameters: None,
            fallback_reason: None,
            gradient_regions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> ConversionResult {
        ConversionResult {
            svg: "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>".into(),
            processing_time: 0.25,
            strategy_used: "classical".into(),
            quality_score: 0.9,
            metadata: ResultMetadata {
                num_elements: 0,
                content_type: ContentType::Contour,
                image_metadata: ImageMetadata {
                    width: 4,
                    height: 4,
                    edge_density: 0.0,
                    text_probability: 0.0,
                    geometric_probability: 0.0,
                    gradient_probability: 0.0,
                },
                parameter_source: None,
                tracing_parameters: None,
                fallback_reason: None,
                gradient_regions: Vec::new(),
            },
        }
    }

    #[test]
    fn test_summary_json_omits_svg() {
        let json = serde_json::to_value(result()).unwrap();
        assert!(json.get("svg").is_none());
        assert_eq!(json["strategy_used"], "classical");
        assert_eq!(json["metadata"]["content_type"], "contour");
        assert_eq!(json["metadata"]["image_metadata"]["width"], 4);
        assert!(json["metadata"].get("fallback_reason").is_none());
    }

    #[test]
    fn test_save_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.svg");
        let r = result();
        r.save(&path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), r.svg);
    }
}
