use std::collections::HashMap;

use anyhow::Result;
use futures::stream::{self, StreamExt};

use crate::api::TextGenerator;
use crate::errors::LessonError;
use crate::language::{self, LanguagePolicy};
use crate::llm_json;
use crate::models::{
    DialogueExchange, LlmSplitSentence, LlmVocabWord, RawSentence, SpeakerVoice, VocabularyItem,
};
use crate::scorer;

// 一个对话交换在成品课程里大约占 90 秒
const SECONDS_PER_EXCHANGE: u32 = 90;

// 提取结果：成品交换列表，外加本次分配的音色表
// （调用方把音色表存回名单，下次同场景提取保持连贯）
#[derive(Debug)]
pub struct ExtractionResult {
    pub exchanges: Vec<DialogueExchange>,
    pub voice_assignments: Vec<SpeakerVoice>,
}

// 对话交换提取管线：拆长句 → 按时长抽样 → 批量提词 → 过滤 → 分配音色。
// 拆句和提词各自独立降级，整条管线只在输入为空时失败
pub struct ExtractionPipeline<'a> {
    split_generator: &'a dyn TextGenerator,
    vocab_generator: &'a dyn TextGenerator,
    policy: &'static LanguagePolicy,
    concurrent_requests: usize,
}

impl<'a> ExtractionPipeline<'a> {
    pub fn new(
        split_generator: &'a dyn TextGenerator,
        vocab_generator: &'a dyn TextGenerator,
        policy: &'static LanguagePolicy,
        concurrent_requests: usize,
    ) -> Self {
        ExtractionPipeline {
            split_generator,
            vocab_generator,
            policy,
            concurrent_requests,
        }
    }

    pub async fn extract(
        &self,
        sentences: &[RawSentence],
        target_duration_minutes: u32,
        genders: (&str, &str),
        roster: &[SpeakerVoice],
    ) -> Result<ExtractionResult, LessonError> {
        if sentences.is_empty() {
            return Err(LessonError::EmptyDialogue);
        }

        let split = self.split_long_sentences(sentences).await;
        let selected = select_exchanges(split, target_duration_minutes);
        println!("  🎬 选出 {} 个对话交换", selected.len());

        let mut vocabulary = self.extract_vocabulary(&selected).await;

        let mut voices = VoiceAssigner::new(genders, roster);
        let exchanges = selected
            .into_iter()
            .enumerate()
            .map(|(order, sentence)| {
                let (speaker_name, relationship) = match &sentence.speaker {
                    Some(speaker) => (speaker.name.clone(), speaker.relationship.clone()),
                    None => (format!("話者{}", order % 2 + 1), String::new()),
                };
                let voice_id = voices.voice_for(&speaker_name);
                DialogueExchange {
                    order,
                    speaker_name,
                    relationship,
                    voice_id,
                    text: sentence.text,
                    reading: sentence.reading,
                    translation: sentence.translation,
                    vocabulary: vocabulary.remove(&order).unwrap_or_default(),
                }
            })
            .collect();

        Ok(ExtractionResult {
            exchanges,
            voice_assignments: voices.into_assignments(),
        })
    }

    // 第一步：拆开包含多句话的台词。
    // 每个需要拆分的句子单独请求一次；buffered 并发但保持原有顺序
    pub async fn split_long_sentences(&self, sentences: &[RawSentence]) -> Vec<RawSentence> {
        let results: Vec<Vec<RawSentence>> = stream::iter(sentences.to_vec())
            .map(|sentence| self.split_one(sentence))
            .buffered(self.concurrent_requests.max(1))
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }

    async fn split_one(&self, sentence: RawSentence) -> Vec<RawSentence> {
        if language::terminal_mark_count(&sentence.text) <= 1 {
            return vec![sentence];
        }

        match self.request_split(&sentence).await {
            Ok(parts) if parts.len() >= 2 => {
                println!("  ✂️  台词拆分为 {} 句: {}", parts.len(), sentence.text);
                parts
                    .into_iter()
                    .map(|part| RawSentence {
                        id: sentence.id,
                        text: part.text,
                        translation: part.translation,
                        speaker: sentence.speaker.clone(),
                        reading: None,
                        kanji_count: None,
                    })
                    .collect()
            }
            Ok(_) => {
                println!("  ⚠️  拆分结果不足两句，保留原句: {}", sentence.text);
                vec![sentence]
            }
            Err(e) => {
                println!("  ⚠️  拆分请求失败，保留原句: {} ({})", sentence.text, e);
                vec![sentence]
            }
        }
    }

    async fn request_split(&self, sentence: &RawSentence) -> Result<Vec<LlmSplitSentence>> {
        let prompt = format!(r#"
下面这句台词其实包含多句话，请把它拆分成独立的句子，并给每句配上中文翻译。

要求：
1. 保持原有顺序，不要改写原文
2. 返回 JSON 数组，每个元素是 {{"text": "原文句子", "translation": "中文翻译"}}
3. 只返回JSON格式，不要添加其他内容

原句：{}
原翻译：{}
"#, sentence.text, sentence.translation);

        let content = self.split_generator.generate(&prompt).await?;
        llm_json::parse_array(&content)
    }

    // 第三步：一次批量请求提取全部交换的重点词汇，随后做确定性过滤。
    // 整批失败时返回空表，所有交换带空词汇表继续
    pub async fn extract_vocabulary(
        &self,
        sentences: &[RawSentence],
    ) -> HashMap<usize, Vec<VocabularyItem>> {
        if sentences.is_empty() {
            return HashMap::new();
        }

        let listing = sentences
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i, s.text))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(r#"
请从下面每句台词里挑出 1 到 2 个值得单独学习的重点实词（名词、动词、形容词等）。

要求：
1. 不要选助词、系动词，也不要选"これ/それ"这类极常用词
2. 每个词用辞书形，提供假名读音、中文翻译和 JLPT 等级（N5-N1）
3. 按句子编号返回 JSON 对象，键是编号字符串
4. 只返回JSON格式，不要添加其他内容

返回格式：
{{
  "0": [
    {{"text": "辞书形", "reading": "かな", "translation": "中文翻译", "level": "N5"}}
  ]
}}

台词列表：
{}
"#, listing);

        let parsed: Result<HashMap<String, Vec<LlmVocabWord>>> = self
            .vocab_generator
            .generate(&prompt)
            .await
            .and_then(|content| llm_json::parse_object(&content));

        let raw = match parsed {
            Ok(map) => map,
            Err(e) => {
                println!("  ⚠️  词汇提取失败，本课词汇表为空: {}", e);
                return HashMap::new();
            }
        };

        let mut result = HashMap::new();
        for (key, words) in raw {
            let Ok(index) = key.parse::<usize>() else {
                continue;
            };
            let filtered: Vec<VocabularyItem> = words
                .into_iter()
                .filter(|word| {
                    let keep = keep_vocabulary(&word.text, self.policy);
                    if !keep {
                        println!("  🚮 过滤掉候选词: {}", word.text);
                    }
                    keep
                })
                .map(|word| VocabularyItem {
                    text: word.text,
                    reading: word.reading,
                    translation: word.translation,
                    proficiency_tag: word.level,
                })
                .collect();
            result.insert(index, filtered);
        }
        result
    }
}

// 第二步：按目标时长决定交换数量。装不下就步进抽样，保持题材多样
pub fn select_exchanges(sentences: Vec<RawSentence>, target_duration_minutes: u32) -> Vec<RawSentence> {
    let target = ((target_duration_minutes * 60 / SECONDS_PER_EXCHANGE) as usize).max(1);
    if sentences.len() <= target {
        return sentences;
    }
    scorer::stride_sample_indices(sentences.len(), target)
        .into_iter()
        .map(|i| sentences[i].clone())
        .collect()
}

// 第四步：确定性词汇过滤。只对定义了停用词表的语言生效，其他语言直接放行
pub fn keep_vocabulary(word: &str, policy: &LanguagePolicy) -> bool {
    if policy.stopwords.is_empty() {
        return true;
    }

    let word = word.trim();
    if word.is_empty() {
        return false;
    }
    // 表意文字语言里不足 2 个字符的词太短
    if policy.logographic && word.chars().count() < 2 {
        return false;
    }
    if policy.stopwords.contains(&word) {
        return false;
    }
    // 孤立的单个音节文字不成词
    let mut chars = word.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if language::is_kana(c) {
            return false;
        }
    }
    true
}

// 默认音色池：按说话人性别取 Azure 神经音色
fn default_voice(gender: &str, alternate: bool) -> &'static str {
    match (gender, alternate) {
        ("male", false) => "ja-JP-KeitaNeural",
        ("male", true) => "ja-JP-DaichiNeural",
        (_, false) => "ja-JP-NanamiNeural",
        (_, true) => "ja-JP-MayuNeural",
    }
}

// 第五步：说话人 → 音色。映射只活在一次提取里，结束即丢弃；
// 同名说话人在一次提取里永远拿到同一个音色
pub struct VoiceAssigner<'a> {
    assigned: Vec<(String, String)>, // (小写名字, 音色)，保持首次出现顺序
    roster: &'a [SpeakerVoice],
    pool: [&'static str; 2],
    next_default: usize,
}

impl<'a> VoiceAssigner<'a> {
    pub fn new(genders: (&str, &str), roster: &'a [SpeakerVoice]) -> Self {
        let first = default_voice(genders.0, false);
        // 两个默认音色绝不能相同：同性别时第二个取备用音色
        let second = if default_voice(genders.1, false) == first {
            default_voice(genders.1, true)
        } else {
            default_voice(genders.1, false)
        };

        VoiceAssigner {
            assigned: Vec::new(),
            roster,
            pool: [first, second],
            next_default: 0,
        }
    }

    pub fn voice_for(&mut self, speaker_name: &str) -> String {
        let key = speaker_name.to_lowercase();
        if let Some((_, voice)) = self.assigned.iter().find(|(name, _)| *name == key) {
            return voice.clone();
        }

        // 首次出现：先查已知名单（大小写不敏感的精确匹配），再轮转默认池
        let voice = self
            .roster
            .iter()
            .find(|known| known.speaker_name.to_lowercase() == key)
            .map(|known| known.voice_id.clone())
            .unwrap_or_else(|| {
                let voice = self.pool[self.next_default % self.pool.len()].to_string();
                self.next_default += 1;
                voice
            });

        self.assigned.push((key, voice.clone()));
        voice
    }

    pub fn into_assignments(self) -> Vec<SpeakerVoice> {
        self.assigned
            .into_iter()
            .map(|(speaker_name, voice_id)| SpeakerVoice { speaker_name, voice_id })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::StubGenerator;
    use crate::language::policy_for;
    use crate::models::SpeakerRef;

    fn sentence(id: usize, speaker: &str, text: &str, translation: &str) -> RawSentence {
        RawSentence {
            id,
            text: text.to_string(),
            translation: translation.to_string(),
            speaker: Some(SpeakerRef {
                name: speaker.to_string(),
                relationship: "友人".to_string(),
            }),
            reading: None,
            kanji_count: None,
        }
    }

    #[tokio::test]
    async fn splits_sentence_with_two_terminal_marks() {
        let split_stub = StubGenerator::replying(r#"[
  {"text": "田中さんは元気です。", "translation": "田中先生很好。"},
  {"text": "今日は晴れです。", "translation": "今天是晴天。"}
]"#);
        let vocab_stub = StubGenerator::failing();
        let pipeline = ExtractionPipeline::new(&split_stub, &vocab_stub, policy_for("ja"), 2);

        let input = vec![sentence(0, "佐藤", "田中さんは元気です。今日は晴れです。", "田中先生很好。今天是晴天。")];
        let split = pipeline.split_long_sentences(&input).await;

        assert_eq!(split_stub.call_count(), 1);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].text, "田中さんは元気です。");
        assert_eq!(split[0].translation, "田中先生很好。");
        assert_eq!(split[1].text, "今日は晴れです。");
        // 说话人随拆分保留
        assert_eq!(split[1].speaker.as_ref().map(|s| s.name.as_str()), Some("佐藤"));
    }

    #[tokio::test]
    async fn split_failure_keeps_original_sentence() {
        let split_stub = StubGenerator::failing();
        let vocab_stub = StubGenerator::failing();
        let pipeline = ExtractionPipeline::new(&split_stub, &vocab_stub, policy_for("ja"), 2);

        let input = vec![sentence(0, "佐藤", "雨です。傘があります。", "下雨了。有伞。")];
        let split = pipeline.split_long_sentences(&input).await;

        assert_eq!(split.len(), 1);
        assert_eq!(split[0].text, "雨です。傘があります。");
    }

    #[tokio::test]
    async fn single_terminal_mark_skips_the_service() {
        let split_stub = StubGenerator::replying("[]");
        let vocab_stub = StubGenerator::failing();
        let pipeline = ExtractionPipeline::new(&split_stub, &vocab_stub, policy_for("ja"), 2);

        let input = vec![sentence(0, "佐藤", "こんにちは。", "你好。")];
        let split = pipeline.split_long_sentences(&input).await;

        assert_eq!(split_stub.call_count(), 0);
        assert_eq!(split.len(), 1);
    }

    #[test]
    fn exchange_count_follows_duration_budget() {
        let sentences: Vec<RawSentence> = (0..12)
            .map(|i| sentence(i, "佐藤", "こんにちは。", "你好。"))
            .collect();

        // 10 分钟 ÷ 90 秒 = 6 个交换
        let selected = select_exchanges(sentences.clone(), 10);
        assert_eq!(selected.len(), 6);

        // 装得下就全用
        let few: Vec<RawSentence> = sentences.into_iter().take(4).collect();
        assert_eq!(select_exchanges(few, 10).len(), 4);
    }

    #[test]
    fn vocabulary_filter_for_japanese() {
        let ja = policy_for("ja");
        // 助词、单个假名、单个汉字都被过滤，实词保留
        assert!(!keep_vocabulary("は", ja));
        assert!(!keep_vocabulary("ね", ja));
        assert!(!keep_vocabulary("水", ja));
        assert!(!keep_vocabulary("です", ja));
        assert!(!keep_vocabulary("これ", ja));
        assert!(keep_vocabulary("天気", ja));
        assert!(keep_vocabulary("買い物", ja));
    }

    #[test]
    fn languages_without_stopword_list_pass_through() {
        let es = policy_for("es");
        assert!(keep_vocabulary("de", es));
        assert!(keep_vocabulary("y", es));
    }

    #[test]
    fn voice_is_stable_per_speaker_within_one_run() {
        let mut voices = VoiceAssigner::new(("female", "male"), &[]);
        let tanaka_first = voices.voice_for("田中");
        let sato = voices.voice_for("佐藤");
        let tanaka_again = voices.voice_for("田中");

        assert_eq!(tanaka_first, tanaka_again);
        assert_ne!(tanaka_first, sato);
    }

    #[test]
    fn same_gender_speakers_get_distinct_defaults() {
        let mut voices = VoiceAssigner::new(("female", "female"), &[]);
        let first = voices.voice_for("花子");
        let second = voices.voice_for("恵子");
        assert_ne!(first, second);
    }

    #[test]
    fn roster_lookup_is_case_insensitive() {
        let roster = vec![SpeakerVoice {
            speaker_name: "Tanaka".to_string(),
            voice_id: "ja-JP-AoiNeural".to_string(),
        }];
        let mut voices = VoiceAssigner::new(("female", "male"), &roster);
        assert_eq!(voices.voice_for("tanaka"), "ja-JP-AoiNeural");
        // 名单外的说话人仍从默认池取
        assert_eq!(voices.voice_for("佐藤"), "ja-JP-NanamiNeural");
    }

    #[tokio::test]
    async fn vocab_batch_failure_yields_empty_lists_not_abort() {
        let split_stub = StubGenerator::replying("[]");
        let vocab_stub = StubGenerator::failing();
        let pipeline = ExtractionPipeline::new(&split_stub, &vocab_stub, policy_for("ja"), 2);

        let input = vec![
            sentence(0, "田中", "こんにちは。", "你好。"),
            sentence(1, "佐藤", "いい天気ですね。", "天气真好啊。"),
        ];
        let result = pipeline.extract(&input, 10, ("female", "male"), &[]).await.unwrap();

        assert_eq!(result.exchanges.len(), 2);
        for exchange in &result.exchanges {
            assert!(exchange.vocabulary.is_empty());
        }
        // 音色分配不受词汇失败影响
        assert_eq!(result.exchanges[0].voice_id, "ja-JP-NanamiNeural");
        assert_eq!(result.exchanges[1].voice_id, "ja-JP-KeitaNeural");
    }

    #[tokio::test]
    async fn full_extraction_attaches_vocabulary_by_exchange() {
        let split_stub = StubGenerator::replying("[]");
        let vocab_stub = StubGenerator::replying(r#"{
  "0": [{"text": "天気", "reading": "てんき", "translation": "天气", "level": "N5"}],
  "1": [{"text": "は", "translation": "主题助词"}]
}"#);
        let pipeline = ExtractionPipeline::new(&split_stub, &vocab_stub, policy_for("ja"), 2);

        let input = vec![
            sentence(0, "田中", "いい天気ですね。", "天气真好啊。"),
            sentence(1, "佐藤", "そうですね。", "是啊。"),
        ];
        let result = pipeline.extract(&input, 10, ("female", "male"), &[]).await.unwrap();

        assert_eq!(result.exchanges[0].vocabulary.len(), 1);
        assert_eq!(result.exchanges[0].vocabulary[0].text, "天気");
        assert_eq!(result.exchanges[0].vocabulary[0].proficiency_tag.as_deref(), Some("N5"));
        // 助词被过滤后该交换词汇表为空
        assert!(result.exchanges[1].vocabulary.is_empty());

        // order 是成品课程里的 0 起始顺序
        assert_eq!(result.exchanges[0].order, 0);
        assert_eq!(result.exchanges[1].order, 1);

        // 本次分配的音色表随结果返回
        assert_eq!(result.voice_assignments.len(), 2);
    }

    #[tokio::test]
    async fn empty_dialogue_fails_loud() {
        let split_stub = StubGenerator::replying("[]");
        let vocab_stub = StubGenerator::replying("{}");
        let pipeline = ExtractionPipeline::new(&split_stub, &vocab_stub, policy_for("ja"), 2);

        let result = pipeline.extract(&[], 10, ("female", "male"), &[]).await;
        assert!(matches!(result, Err(LessonError::EmptyDialogue)));
    }
}
