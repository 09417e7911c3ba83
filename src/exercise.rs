use anyhow::Result;
use serde::Deserialize;

use crate::api::TextGenerator;
use crate::errors::LessonError;
use crate::grammar_points;
use crate::llm_json;
use crate::models::{PiItem, PiSession};

pub const DEFAULT_ITEM_COUNT: usize = 10;

// 生成"处理指令"式语法理解练习：学习者必须靠目标语法定位意思，
// 而不是直接考语法形式。一次请求，一次解析；任何失败都响亮报错——
// 编造出来的练习题比明确的失败更糟糕
pub async fn generate_session(
    generator: &dyn TextGenerator,
    grammar_point: &str,
    level: &str,
    item_count: usize,
) -> Result<PiSession, LessonError> {
    if !grammar_points::is_valid_for_level(grammar_point, level) {
        println!("  ⚠️  语法点 {} 不属于 {} 等级，仍按请求生成", grammar_point, level);
    }

    let prompt = compose_prompt(grammar_point, level, item_count);

    let content = generator
        .generate(&prompt)
        .await
        .map_err(|e| LessonError::Generation(anyhow::anyhow!("练习生成请求失败: {}", e)))?;

    let items = parse_items(&content).map_err(LessonError::Generation)?;
    validate_items(&items).map_err(LessonError::Generation)?;
    report_balance(&items);

    Ok(PiSession {
        items,
        level: level.to_string(),
        grammar_point: grammar_point.to_string(),
    })
}

fn compose_prompt(grammar_point: &str, level: &str, item_count: usize) -> String {
    let (name, description) = match grammar_points::metadata_for(grammar_point) {
        Some(meta) => (meta.name, meta.description),
        None => (grammar_point, "目标语法对比"),
    };
    let ceiling = grammar_points::vocabulary_ceiling(level);
    let guidance = grammar_points::guidance_for(grammar_point);

    format!(r#"
请为日语学习者设计 {item_count} 道"处理指令"式语法理解题。
目标语法对比：{name}（等级 {level}）。
对比说明：{description}

词汇范围：
{ceiling}

出题指引：
{guidance}

质检清单（输出前必须逐条自查，不合格的题要改写后再输出）：
1. 每道题的所有选项文本都必须原样出现在主句 mainSentence 里
2. 正确答案在两个选项位置上的分布要接近各半，最多不超过 7:3
3. contextSentence 只提供背景，绝不能暗示正确答案
4. 题目考查的是"靠语法定位意思"，不允许只考语法形式
5. 每道题有且只有一个选项的 is_correct 为 true
6. audioText 是朗读用文本：背景句（如果有）加主句

请用以下JSON格式返回结果：
{{
  "items": [
    {{
      "type": "referent",
      "question": "谁打了电话？",
      "contextSentence": "背景句（可省略）",
      "mainSentence": "主句",
      "audioText": "朗读文本",
      "choices": [
        {{"id": "a", "text": "选项一", "is_correct": true}},
        {{"id": "b", "text": "选项二", "is_correct": false}}
      ],
      "explanation": "中文解析",
      "sentencePair": {{"first": "最小对句子一", "second": "最小对句子二"}}
    }}
  ]
}}

只返回JSON格式，不要添加其他内容。
"#)
}

#[derive(Debug, Deserialize)]
struct ItemsPayload {
    items: Vec<PiItem>,
}

// 响应可能是 {"items": [...]} 也可能是裸数组
fn parse_items(content: &str) -> Result<Vec<PiItem>> {
    if let Ok(payload) = llm_json::parse_object::<ItemsPayload>(content) {
        return Ok(payload.items);
    }
    llm_json::parse_array(content)
}

fn validate_items(items: &[PiItem]) -> Result<()> {
    if items.is_empty() {
        anyhow::bail!("练习生成结果为空");
    }

    for (i, item) in items.iter().enumerate() {
        if item.main_sentence.trim().is_empty() {
            anyhow::bail!("第 {} 题缺少主句", i + 1);
        }
        if item.choices.len() < 2 {
            anyhow::bail!("第 {} 题选项不足两个", i + 1);
        }
        let correct_count = item.choices.iter().filter(|c| c.is_correct).count();
        if correct_count != 1 {
            anyhow::bail!("第 {} 题有 {} 个正确选项，必须恰好一个", i + 1, correct_count);
        }
        if item.choices.iter().any(|c| c.text.trim().is_empty()) {
            anyhow::bail!("第 {} 题有空白选项", i + 1);
        }
    }

    Ok(())
}

// 正确答案在各选项位置上的分布。过于偏斜说明模型没执行自查清单，
// 只记录不拦截——结构合法的题目仍然可用
pub fn correct_position_counts(items: &[PiItem]) -> Vec<usize> {
    let slots = items.iter().map(|item| item.choices.len()).max().unwrap_or(0);
    let mut counts = vec![0usize; slots];
    for item in items {
        if let Some(position) = item.choices.iter().position(|c| c.is_correct) {
            counts[position] += 1;
        }
    }
    counts
}

fn report_balance(items: &[PiItem]) {
    let counts = correct_position_counts(items);
    println!("  📊 正确答案位置分布: {:?}", counts);
    if let (Some(max), Some(min)) = (counts.iter().max(), counts.iter().min()) {
        if items.len() >= 10 && *max > items.len() * 7 / 10 {
            println!("  ⚠️  答案位置分布偏斜（{}/{}），建议重新生成", max, min);
        }
    }
}
