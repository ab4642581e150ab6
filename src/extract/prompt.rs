// Prompt construction for insight extraction
//
// The product is Chinese-language: the instruction, the field descriptions in
// the response schema, and the card labels are all Chinese. The article is
// embedded verbatim between the instruction and the palette request.

/// Instruction placed before the article
const ANALYSIS_INSTRUCTION: &str =
    "分析以下文章内容，并提取其核心洞见、关键阶段和智慧总结。请以高密度的知识结构呈现。";

/// Instruction placed after the article: infer the palette from the tone
const PALETTE_INSTRUCTION: &str =
    "请根据文章的情感基调（如：专业、温暖、激励、深刻）生成一组和谐的色彩方案。";

/// Build the single-turn prompt for one article
pub fn build_prompt(source_text: &str) -> String {
    format!(
        "{}\n\n文章内容:\n{}\n\n{}",
        ANALYSIS_INSTRUCTION, source_text, PALETTE_INSTRUCTION
    )
}
