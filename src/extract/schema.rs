// Structured-output schema declared to the generative service
//
// Mirrors the card contract field for field: every object lists its required
// keys, `stages` carries the cardinality bounds, and `structureType` is an
// enum. Gemini uses the OpenAPI-subset dialect (upper-case type names).

use crate::card::{MAX_STAGES, MIN_STAGES};
use serde_json::{json, Value};

/// Top-level keys every card must carry
pub const REQUIRED_FIELDS: [&str; 8] = [
    "title",
    "subtitle",
    "coreInsight",
    "structureType",
    "stages",
    "transformation",
    "wisdomQuote",
    "colors",
];

/// Build the `responseSchema` for a card
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING", "description": "文章主标题 (40px scale)" },
            "subtitle": { "type": "STRING", "description": "副标题 (32px scale)" },
            "coreInsight": {
                "type": "STRING",
                "description": "最核心、最违反直觉或最具影响力的想法"
            },
            "structureType": {
                "type": "STRING",
                "enum": ["process", "comparison", "concept"],
                "description": "文章逻辑结构：过程（顺序）、比较（对比）或概念（原则）"
            },
            "stages": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "label": { "type": "STRING", "description": "阶段/组成部分名称" },
                        "description": { "type": "STRING", "description": "简短描述" },
                        "icon": {
                            "type": "STRING",
                            "description": "对应的 Font Awesome 6 图标类名 (例如: fa-solid fa-rocket)"
                        }
                    },
                    "required": ["label", "description", "icon"]
                },
                "minItems": MIN_STAGES,
                "maxItems": MAX_STAGES
            },
            "transformation": {
                "type": "OBJECT",
                "properties": {
                    "before": { "type": "STRING", "description": "转变前的状态/旧观念" },
                    "after": { "type": "STRING", "description": "转变后的状态/新智慧" }
                },
                "required": ["before", "after"]
            },
            "wisdomQuote": { "type": "STRING", "description": "一句令人难忘的经典智慧之语" },
            "colors": {
                "type": "OBJECT",
                "properties": {
                    "primary": { "type": "STRING", "description": "主色调 (Hex)" },
                    "secondary": { "type": "STRING", "description": "辅助色 (Hex)" },
                    "accent": { "type": "STRING", "description": "强调色 (Hex)" },
                    "background": { "type": "STRING", "description": "卡片浅背景色 (Hex)" }
                },
                "required": ["primary", "secondary", "accent", "background"]
            }
        },
        "required": REQUIRED_FIELDS
    })
}
