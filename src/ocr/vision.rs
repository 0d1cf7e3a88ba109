//! Decoding of Vision `images:annotate` responses.
//!
//! Only the first response and the first page of its full-text annotation
//! are read. Vertices omit zero coordinates, blocks omit `TEXT` as their
//! type, and pages without dimensions are taken as 1000×1000.

use serde::Deserialize;

use super::{RawBlock, RawPage, RawParagraph, RawWord, Vertex};
use crate::error::{Error, Result};
use crate::model::{BlockTag, DetectedLanguage};

const DEFAULT_DIMENSION: f32 = 1000.0;

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    full_text_annotation: Option<TextAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl Status {
    fn into_error(self) -> Error {
        if self.code == 0 {
            Error::Ocr(self.message)
        } else {
            Error::Ocr(format!("{} (code {})", self.message, self.code))
        }
    }
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    text: String,
    #[serde(default)]
    pages: Vec<VisionPage>,
}

#[derive(Debug, Deserialize)]
struct VisionPage {
    width: Option<f32>,
    height: Option<f32>,
    property: Option<TextProperty>,
    #[serde(default)]
    blocks: Vec<VisionBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextProperty {
    #[serde(default)]
    detected_languages: Vec<VisionLanguage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisionLanguage {
    #[serde(default)]
    language_code: String,
    #[serde(default)]
    confidence: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisionBlock {
    #[serde(default)]
    block_type: BlockTag,
    #[serde(default)]
    paragraphs: Vec<VisionParagraph>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisionParagraph {
    bounding_box: Option<BoundingPoly>,
    confidence: Option<f32>,
    #[serde(default)]
    words: Vec<VisionWord>,
}

#[derive(Debug, Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

#[derive(Debug, Deserialize)]
struct VisionWord {
    confidence: Option<f32>,
    #[serde(default)]
    symbols: Vec<Symbol>,
}

#[derive(Debug, Deserialize)]
struct Symbol {
    #[serde(default)]
    text: String,
}

/// Decode a Vision `images:annotate` batch response into a [`RawPage`].
///
/// Error objects, at the top level or in the first response, become
/// [`Error::Ocr`]. A response without a full-text annotation is an empty
/// page.
pub fn decode_response(json: &str) -> Result<RawPage> {
    let batch: BatchResponse = serde_json::from_str(json)?;

    if let Some(status) = batch.error {
        return Err(status.into_error());
    }

    let Some(response) = batch.responses.into_iter().next() else {
        log::debug!("Vision batch has no responses");
        return Ok(RawPage::default());
    };

    if let Some(status) = response.error {
        return Err(status.into_error());
    }

    let Some(annotation) = response.full_text_annotation else {
        return Ok(RawPage::default());
    };

    let full_text = annotation.text;
    let Some(page) = annotation.pages.into_iter().next() else {
        return Ok(RawPage {
            full_text,
            ..Default::default()
        });
    };

    let languages = page
        .property
        .map(|p| {
            p.detected_languages
                .into_iter()
                .map(|l| DetectedLanguage::new(l.language_code, l.confidence))
                .collect()
        })
        .unwrap_or_default();

    let blocks = page.blocks.into_iter().map(convert_block).collect();

    Ok(RawPage {
        width: page.width.unwrap_or(DEFAULT_DIMENSION),
        height: page.height.unwrap_or(DEFAULT_DIMENSION),
        blocks,
        languages,
        full_text,
    })
}

fn convert_block(block: VisionBlock) -> RawBlock {
    RawBlock {
        block: block.block_type,
        paragraphs: block
            .paragraphs
            .into_iter()
            .map(|para| RawParagraph {
                vertices: para.bounding_box.map(|b| b.vertices).unwrap_or_default(),
                confidence: para.confidence,
                words: para
                    .words
                    .into_iter()
                    .map(|word| RawWord {
                        text: word.symbols.into_iter().map(|s| s.text).collect(),
                        confidence: word.confidence,
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_page() {
        let json = r#"{
            "responses": [{
                "fullTextAnnotation": {
                    "text": "Hi\n",
                    "pages": [{
                        "width": 800,
                        "height": 1200,
                        "blocks": [{
                            "paragraphs": [{
                                "boundingBox": {"vertices": [{}, {"x": 40}, {"x": 40, "y": 12}, {"y": 12}]},
                                "confidence": 0.97,
                                "words": [{"confidence": 0.97, "symbols": [{"text": "H"}, {"text": "i"}]}]
                            }]
                        }]
                    }]
                }
            }]
        }"#;
        let page = decode_response(json).unwrap();
        assert_eq!(page.width, 800.0);
        assert_eq!(page.height, 1200.0);
        assert_eq!(page.full_text, "Hi\n");
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.blocks[0].block, BlockTag::Text);

        let para = &page.blocks[0].paragraphs[0];
        assert_eq!(para.top_left(), Some((0.0, 0.0)));
        assert_eq!(para.bottom_right(), Some((40.0, 12.0)));
        assert_eq!(para.words[0].text, "Hi");
    }

    #[test]
    fn test_decode_default_dimensions() {
        let json = r#"{"responses": [{"fullTextAnnotation": {"text": "", "pages": [{}]}}]}"#;
        let page = decode_response(json).unwrap();
        assert_eq!(page.width, 1000.0);
        assert_eq!(page.height, 1000.0);
        assert!(page.is_empty());
    }

    #[test]
    fn test_decode_no_annotation() {
        let page = decode_response(r#"{"responses": [{}]}"#).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_decode_errors() {
        let err = decode_response(r#"{"error": {"code": 403, "message": "denied"}}"#).unwrap_err();
        assert_eq!(err.to_string(), "OCR error: denied (code 403)");

        let err = decode_response(r#"{"responses": [{"error": {"message": "bad image"}}]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Ocr(ref m) if m == "bad image"));

        assert!(matches!(decode_response("not json"), Err(Error::Json(_))));
    }
}
