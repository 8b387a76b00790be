// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MinerU `middle_json` ingestion.
//
// The layout engine writes one entry per page under `pdf_info`, each with
// `para_blocks` (or `preproc_blocks` on older versions) whose text lives in
// `lines[].spans[].content`. Only the fields needed for detection are read;
// everything else is ignored.

use examcrop_core::error::{ExamCropError, Result};
use examcrop_core::{BBox, DetectorConfig, LayoutBlock, LayoutDocument, LayoutPage};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

/// Block types that never carry question text.
const NON_TEXT_TYPES: &[&str] = &["image", "table", "interline_equation"];

#[derive(Debug, Deserialize)]
struct MiddleJson {
    pdf_info: Option<Vec<PageInfo>>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(default)]
    page_idx: Option<Value>,
    #[serde(default)]
    para_blocks: Option<Vec<Value>>,
    #[serde(default)]
    preproc_blocks: Option<Vec<Value>>,
    #[serde(default)]
    page_size: Option<Value>,
}

/// Block fields are kept as raw values and interpreted leniently.
#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(default)]
    bbox: Option<Value>,
    #[serde(default, rename = "type")]
    kind: Option<Value>,
    #[serde(default)]
    lines: Option<Value>,
}

/// Parse a MinerU `middle_json` document.
///
/// A missing `pdf_info` list is a hard failure, as is a page entry that is not
/// an object. Inside a page, anything malformed degrades gracefully: a bad
/// `bbox` becomes a block without a bounding box, unreadable `type` or `lines`
/// fields count as a text block with no text, a block entry that is not an
/// object is skipped, and a bad `page_size` or `page_idx` falls back to the
/// configured defaults or the page's position.
#[instrument(skip_all, fields(bytes_len = text.len()))]
pub fn parse_middle_json(text: &str, config: &DetectorConfig) -> Result<LayoutDocument> {
    let raw: MiddleJson = serde_json::from_str(text)
        .map_err(|err| ExamCropError::Layout(format!("invalid middle_json: {}", err)))?;
    let pages = raw.pdf_info.ok_or(ExamCropError::MissingPageList)?;

    let pages: Vec<LayoutPage> = pages
        .into_iter()
        .enumerate()
        .map(|(position, page)| convert_page(position, page, config))
        .collect();

    debug!(
        pages = pages.len(),
        blocks = pages.iter().map(|p| p.blocks.len()).sum::<usize>(),
        "Layout parsed"
    );
    Ok(LayoutDocument { pages })
}

fn convert_page(position: usize, page: PageInfo, config: &DetectorConfig) -> LayoutPage {
    let (width, height) = page
        .page_size
        .as_ref()
        .and_then(parse_page_size)
        .unwrap_or((config.default_page_width, config.default_page_height));

    let blocks = match page.para_blocks {
        Some(blocks) if !blocks.is_empty() => blocks,
        _ => page.preproc_blocks.unwrap_or_default(),
    };
    let index = page
        .page_idx
        .as_ref()
        .and_then(Value::as_u64)
        .map_or(position, |idx| idx as usize);

    LayoutPage {
        index,
        width,
        height,
        blocks: blocks
            .iter()
            .filter_map(|value| match RawBlock::deserialize(value) {
                Ok(block) => Some(convert_block(block)),
                Err(err) => {
                    debug!(page = index, %err, "Skipping unreadable layout block");
                    None
                }
            })
            .collect(),
    }
}

fn convert_block(block: RawBlock) -> LayoutBlock {
    let is_text = block
        .kind
        .as_ref()
        .and_then(Value::as_str)
        .is_none_or(|kind| !NON_TEXT_TYPES.contains(&kind));

    let text = block
        .lines
        .as_ref()
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|line| line.get("spans").and_then(Value::as_array))
        .flatten()
        .filter_map(|span| span.get("content").and_then(Value::as_str))
        .filter(|content| !content.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    LayoutBlock {
        bbox: block.bbox.as_ref().and_then(parse_bbox),
        text: text.trim().to_string(),
        is_text,
    }
}

fn parse_bbox(value: &Value) -> Option<BBox> {
    let coords = numbers(value)?;
    let [x0, y0, x1, y1] = *coords.as_slice() else {
        return None;
    };
    Some(BBox::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)))
}

fn parse_page_size(value: &Value) -> Option<(f32, f32)> {
    let dims = numbers(value)?;
    match *dims.as_slice() {
        [w, h] if w > 0.0 && h > 0.0 => Some((w, h)),
        _ => None,
    }
}

fn numbers(value: &Value) -> Option<Vec<f32>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_f64().map(|n| n as f32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "pdf_info": [
            {
                "page_idx": 0,
                "page_size": [595, 842],
                "para_blocks": [
                    {
                        "type": "text",
                        "bbox": [50, 60, 280, 90],
                        "lines": [
                            { "spans": [ { "content": "18." }, { "content": "다음 글의 목적으로" } ] },
                            { "spans": [ { "content": "" }, { "content": "가장 적절한 것은?" } ] }
                        ]
                    },
                    { "type": "image", "bbox": [50, 100, 280, 300], "blocks": [] },
                    { "type": "text", "lines": [] }
                ]
            },
            {
                "preproc_blocks": [
                    { "type": "title", "bbox": [320, 40, 560, 60],
                      "lines": [ { "spans": [ { "content": "19. Next" } ] } ] }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_pages_and_blocks() {
        let doc = parse_middle_json(SAMPLE, &DetectorConfig::default()).unwrap();
        assert_eq!(doc.pages.len(), 2);

        let first = &doc.pages[0];
        assert_eq!((first.index, first.width, first.height), (0, 595.0, 842.0));
        assert_eq!(first.blocks.len(), 3);
        assert_eq!(first.blocks[0].text, "18. 다음 글의 목적으로 가장 적절한 것은?");
        assert_eq!(first.blocks[0].bbox, Some(BBox::new(50.0, 60.0, 280.0, 90.0)));
        assert!(!first.blocks[1].is_text);
        assert!(first.blocks[2].bbox.is_none());
    }

    #[test]
    fn falls_back_to_preproc_blocks_and_default_size() {
        let doc = parse_middle_json(SAMPLE, &DetectorConfig::default()).unwrap();
        let second = &doc.pages[1];
        assert_eq!(second.index, 1);
        assert_eq!((second.width, second.height), (842.0, 1191.0));
        assert_eq!(second.blocks.len(), 1);
        assert_eq!(second.blocks[0].text, "19. Next");
        assert!(second.blocks[0].is_text);
    }

    #[test]
    fn missing_page_list_is_hard_failure() {
        let err = parse_middle_json(r#"{ "_backend": "pipeline" }"#, &DetectorConfig::default())
            .unwrap_err();
        assert!(matches!(err, ExamCropError::MissingPageList));
    }

    #[test]
    fn invalid_json_is_layout_error() {
        let err = parse_middle_json("not json", &DetectorConfig::default()).unwrap_err();
        assert!(matches!(err, ExamCropError::Layout(_)));
    }

    #[test]
    fn empty_page_list_is_valid() {
        let doc = parse_middle_json(r#"{ "pdf_info": [] }"#, &DetectorConfig::default()).unwrap();
        assert!(doc.pages.is_empty());
    }

    #[test]
    fn malformed_block_fields_degrade_per_block() {
        let text = r#"{ "pdf_info": [ {
            "page_idx": "zero",
            "para_blocks": [
                null,
                { "type": 7, "bbox": [40, 100, 400, 130],
                  "lines": [ { "spans": [ { "content": "18. kept" } ] } ] },
                { "type": "text", "bbox": [40, 140, 400, 170], "lines": null },
                { "type": "text", "bbox": [40, 180, 400, 210],
                  "lines": [ null, { "spans": null }, { "spans": [ { "content": 3 } ] } ] },
                42
            ]
        } ] }"#;
        let doc = parse_middle_json(text, &DetectorConfig::default()).unwrap();
        let page = &doc.pages[0];

        assert_eq!(page.index, 0);
        assert_eq!(page.blocks.len(), 3);
        assert_eq!(page.blocks[0].text, "18. kept");
        assert!(page.blocks[0].is_text);
        assert_eq!(page.blocks[1].text, "");
        assert_eq!(page.blocks[1].bbox, Some(BBox::new(40.0, 140.0, 400.0, 170.0)));
        assert_eq!(page.blocks[2].text, "");
    }

    #[test]
    fn malformed_bbox_becomes_none() {
        assert!(parse_bbox(&serde_json::json!([1, 2, 3])).is_none());
        assert!(parse_bbox(&serde_json::json!("0,0,1,1")).is_none());
        assert!(parse_bbox(&serde_json::json!([1, "a", 3, 4])).is_none());
        assert_eq!(
            parse_bbox(&serde_json::json!([10.5, 20, 5, 40])),
            Some(BBox::new(5.0, 20.0, 10.5, 40.0))
        );
    }
}
