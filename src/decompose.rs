use std::collections::HashMap;

use anyhow::Result;

use crate::api::TextGenerator;
use crate::language::{self, LanguagePolicy};
use crate::llm_json;
use crate::models::{CoreItem, LlmComponent, PhraseComponent};
use crate::scorer::SelectedSentence;

// 一个短语最多拆成 4 个成分
pub const MAX_COMPONENTS: usize = 4;

// 单位数不超过 3 的短语不值得分解，整句就是唯一成分
const SKIP_UNIT_THRESHOLD: usize = 3;

// 把每个选中的短语分解成 1-4 个倒序构建成分。
// 需要分解的短语合并成一次批量请求；任何失败都退回"不分解"，
// 绝不让调用方失败。输出列表与输入列表逐位对应
pub async fn decompose_phrases(
    generator: &dyn TextGenerator,
    phrases: &[SelectedSentence],
    policy: &LanguagePolicy,
) -> Vec<Vec<PhraseComponent>> {
    // 先全部填上整句成分，批量结果到了再逐个覆盖
    let mut results: Vec<Vec<PhraseComponent>> =
        phrases.iter().map(|p| vec![whole_phrase_component(p)]).collect();

    let batch: Vec<(usize, &SelectedSentence)> = phrases
        .iter()
        .enumerate()
        .filter(|(_, p)| language::unit_count(&p.sentence.text, policy) > SKIP_UNIT_THRESHOLD)
        .collect();

    if batch.is_empty() {
        return results;
    }

    match request_batch(generator, &batch).await {
        Ok(mut decomposed) => {
            for (index, phrase) in &batch {
                match decomposed.remove(&index.to_string()) {
                    Some(components) => {
                        let normalized = normalize_components(components);
                        if normalized.is_empty() {
                            println!("  ⚠️  短语 {} 的分解结果为空，退回整句: {}", index, phrase.sentence.text);
                        } else {
                            results[*index] = normalized;
                        }
                    }
                    None => {
                        println!("  ⚠️  响应缺少短语 {}，退回整句: {}", index, phrase.sentence.text);
                    }
                }
            }
        }
        Err(e) => {
            // 整批失败：所有短语退回整句成分并记录原因
            println!("  ⚠️  分解请求失败，{} 个短语全部退回整句: {}", batch.len(), e);
        }
    }

    results
}

// 选好的短语 → 核心操练条目（评分选集 + 批量分解的汇合点）
pub async fn build_core_items(
    generator: &dyn TextGenerator,
    selected: Vec<SelectedSentence>,
    policy: &LanguagePolicy,
) -> Vec<CoreItem> {
    let components = decompose_phrases(generator, &selected, policy).await;

    selected
        .into_iter()
        .zip(components)
        .map(|(sel, components)| CoreItem {
            id: sel.order,
            text: sel.sentence.text.clone(),
            reading: sel.sentence.reading.clone(),
            translation: sel.sentence.translation.clone(),
            complexity_score: sel.complexity_score,
            source_sentence_id: sel.sentence.id,
            order: sel.order,
            components,
        })
        .collect()
}

fn whole_phrase_component(phrase: &SelectedSentence) -> PhraseComponent {
    PhraseComponent {
        text: phrase.sentence.text.clone(),
        reading: phrase.sentence.reading.clone(),
        translation: phrase.sentence.translation.clone(),
        order: 0,
    }
}

// 把成分数量压到上限并重排 order 为 0..k-1 的连续序列。
// 超限时保留开头的片段和最后的完整短语，去掉中间多余的层次
fn normalize_components(components: Vec<LlmComponent>) -> Vec<PhraseComponent> {
    let mut components = components;
    if components.len() > MAX_COMPONENTS {
        let last = components.pop();
        components.truncate(MAX_COMPONENTS - 1);
        if let Some(last) = last {
            components.push(last);
        }
    }

    components
        .into_iter()
        .filter(|c| !c.text.trim().is_empty())
        .enumerate()
        .map(|(order, c)| PhraseComponent {
            text: c.text,
            reading: c.reading,
            translation: c.translation,
            order,
        })
        .collect()
}

async fn request_batch(
    generator: &dyn TextGenerator,
    batch: &[(usize, &SelectedSentence)],
) -> Result<HashMap<String, Vec<LlmComponent>>> {
    let phrase_list = batch
        .iter()
        .map(|(index, phrase)| format!("{}. {}（{}）", index, phrase.sentence.text, phrase.sentence.translation))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(r#"
请把下面的日语短语按"倒序构建"教学法分解，每个短语拆成 2 到 4 个成分：
先教短语结尾的片段，然后每一步在前面增加内容，让学习者总是在已经会发音的部分上往前加词。

要求：
1. 每个短语的成分按教学顺序排列：第一个是短语结尾的片段，最后一个是完整短语
2. 每个成分提供假名读音和中文翻译
3. 按短语编号返回 JSON 对象，键是编号字符串
4. 只返回JSON格式，不要添加其他内容

返回格式：
{{
  "0": [
    {{"text": "片段", "reading": "かな", "translation": "中文翻译"}},
    {{"text": "完整短语", "reading": "かな", "translation": "中文翻译"}}
  ]
}}

要分解的短语：
{}
"#, phrase_list);

    let content = generator.generate(&prompt).await?;
    llm_json::parse_object(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::StubGenerator;
    use crate::language::policy_for;
    use crate::models::RawSentence;

    fn selected(id: usize, text: &str, translation: &str) -> SelectedSentence {
        SelectedSentence {
            sentence: RawSentence {
                id,
                text: text.to_string(),
                translation: translation.to_string(),
                speaker: None,
                reading: None,
                kanji_count: None,
            },
            complexity_score: 10,
            order: id,
        }
    }

    #[tokio::test]
    async fn short_phrases_skip_the_service() {
        let stub = StubGenerator::replying("{}");
        let ja = policy_for("ja");
        let phrases = vec![selected(0, "はい", "是"), selected(1, "どうも", "谢谢")];

        let results = decompose_phrases(&stub, &phrases, ja).await;

        // 全部短于阈值：不发请求，每个短语一个整句成分
        assert_eq!(stub.call_count(), 0);
        assert_eq!(results.len(), 2);
        for (result, phrase) in results.iter().zip(&phrases) {
            assert_eq!(result.len(), 1);
            assert_eq!(result[0].order, 0);
            assert_eq!(result[0].text, phrase.sentence.text);
        }
    }

    #[tokio::test]
    async fn batch_results_are_reinterleaved_by_index() {
        // 短语 0 跳过分解，1 和 2 走批量；响应键是原始下标
        let stub = StubGenerator::replying(r#"```json
{
  "1": [
    {"text": "ください", "reading": "ください", "translation": "请给我"},
    {"text": "コーヒーをください", "reading": "コーヒーをください", "translation": "请给我咖啡"}
  ],
  "2": [
    {"text": "いいですか", "reading": "いいですか", "translation": "可以吗"},
    {"text": "ここでいいですか", "reading": "ここでいいですか", "translation": "这里可以吗"}
  ]
}
```"#);
        let ja = policy_for("ja");
        let phrases = vec![
            selected(0, "はい", "是"),
            selected(1, "コーヒーをください", "请给我咖啡"),
            selected(2, "ここでいいですか", "这里可以吗"),
        ];

        let results = decompose_phrases(&stub, &phrases, ja).await;

        assert_eq!(stub.call_count(), 1);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].len(), 1);
        assert_eq!(results[1][0].text, "ください");
        assert_eq!(results[1][1].text, "コーヒーをください");
        assert_eq!(results[2][0].text, "いいですか");

        // 每个成分列表的 order 都是 0 起始的连续序列
        for result in &results {
            for (k, component) in result.iter().enumerate() {
                assert_eq!(component.order, k);
            }
        }
    }

    #[tokio::test]
    async fn whole_batch_failure_falls_back_to_single_components() {
        let stub = StubGenerator::failing();
        let ja = policy_for("ja");
        let phrases = vec![
            selected(0, "コーヒーをください", "请给我咖啡"),
            selected(1, "駅はどこですか", "车站在哪里"),
        ];

        let results = decompose_phrases(&stub, &phrases, ja).await;

        // 长度不变式：输出与输入逐位对应，整批退回整句
        assert_eq!(results.len(), phrases.len());
        for (result, phrase) in results.iter().zip(&phrases) {
            assert_eq!(result.len(), 1);
            assert_eq!(result[0].order, 0);
            assert_eq!(result[0].text, phrase.sentence.text);
            assert_eq!(result[0].translation, phrase.sentence.translation);
        }
    }

    #[tokio::test]
    async fn oversized_decompositions_keep_ends_and_cap_at_four() {
        let stub = StubGenerator::replying(r#"{
  "0": [
    {"text": "か", "translation": "吗"},
    {"text": "ですか", "translation": "是吗"},
    {"text": "いいですか", "translation": "可以吗"},
    {"text": "でいいですか", "translation": "这样可以吗"},
    {"text": "ここでいいですか", "translation": "这里可以吗"}
  ]
}"#);
        let ja = policy_for("ja");
        let phrases = vec![selected(0, "ここでいいですか", "这里可以吗")];

        let results = decompose_phrases(&stub, &phrases, ja).await;

        assert_eq!(results[0].len(), MAX_COMPONENTS);
        // 完整短语保留在末位
        assert_eq!(results[0][MAX_COMPONENTS - 1].text, "ここでいいですか");
        assert_eq!(results[0][MAX_COMPONENTS - 1].order, 3);
    }

    #[tokio::test]
    async fn missing_index_falls_back_for_that_phrase_only() {
        let stub = StubGenerator::replying(r#"{
  "0": [
    {"text": "ください", "translation": "请给我"},
    {"text": "コーヒーをください", "translation": "请给我咖啡"}
  ]
}"#);
        let ja = policy_for("ja");
        let phrases = vec![
            selected(0, "コーヒーをください", "请给我咖啡"),
            selected(1, "駅はどこですか", "车站在哪里"),
        ];

        let results = decompose_phrases(&stub, &phrases, ja).await;

        assert_eq!(results[0].len(), 2);
        assert_eq!(results[1].len(), 1);
        assert_eq!(results[1][0].text, "駅はどこですか");
    }
}
