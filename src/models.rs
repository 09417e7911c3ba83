use serde::{Deserialize, Serialize};

// 数据结构定义

// 台本里的说话人
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpeakerRef {
    pub name: String,
    pub relationship: String,
}

// 原始台词，管线的不可变输入
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RawSentence {
    pub id: usize,
    pub text: String,
    pub translation: String,
    pub speaker: Option<SpeakerRef>,
    pub reading: Option<String>, // 假名读音，可由台本提供
    pub kanji_count: Option<usize>,
}

// 倒序构建的短语成分，order 0 是短语结尾的片段（最先教）
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PhraseComponent {
    pub text: String,
    pub reading: Option<String>,
    pub translation: String,
    pub order: usize,
}

// 核心操练条目
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CoreItem {
    pub id: usize,
    pub text: String,
    pub reading: Option<String>,
    pub translation: String,
    pub complexity_score: u32,
    pub source_sentence_id: usize,
    pub order: usize,
    pub components: Vec<PhraseComponent>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VocabularyItem {
    pub text: String,
    pub reading: Option<String>,
    pub translation: String,
    pub proficiency_tag: Option<String>, // JLPT 等级标记
}

// 成品课程里的一个对话交换
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DialogueExchange {
    pub order: usize,
    pub speaker_name: String,
    pub relationship: String,
    pub voice_id: String,
    pub text: String,
    pub reading: Option<String>,
    pub translation: String,
    pub vocabulary: Vec<VocabularyItem>,
}

// 完整课程，交给持久层保存
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Lesson {
    pub title: String,
    pub language: String,
    pub core_items: Vec<CoreItem>,
    pub exchanges: Vec<DialogueExchange>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 已知说话人音色，用于同一场景多次生成时保持音色连贯
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct SpeakerVoice {
    pub speaker_name: String,
    pub voice_id: String,
}

// LLM 响应解析用结构。服务端的字段拼写不稳定，每个字段都接受两种写法

#[derive(Debug, Deserialize, Clone)]
pub struct LlmComponent {
    #[serde(alias = "phrase")]
    pub text: String,
    #[serde(default, alias = "kana")]
    pub reading: Option<String>,
    #[serde(alias = "meaning")]
    pub translation: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmSplitSentence {
    #[serde(alias = "sentence")]
    pub text: String,
    #[serde(alias = "meaning")]
    pub translation: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmVocabWord {
    #[serde(alias = "word")]
    pub text: String,
    #[serde(default, alias = "kana")]
    pub reading: Option<String>,
    #[serde(alias = "meaning")]
    pub translation: String,
    #[serde(default, alias = "jlpt")]
    pub level: Option<String>,
}

// "处理指令"式语法练习

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PiChoice {
    pub id: String,
    pub text: String,
    #[serde(alias = "isCorrect")]
    pub is_correct: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SentencePair {
    #[serde(alias = "sentenceA")]
    pub first: String,
    #[serde(alias = "sentenceB")]
    pub second: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PiItem {
    #[serde(rename = "type", alias = "item_type")]
    pub item_type: String,
    pub question: String,
    #[serde(default, alias = "contextSentence")]
    pub context_sentence: Option<String>,
    #[serde(alias = "mainSentence")]
    pub main_sentence: String,
    #[serde(alias = "audioText")]
    pub audio_text: String,
    pub choices: Vec<PiChoice>,
    pub explanation: String,
    #[serde(default, alias = "sentencePair")]
    pub sentence_pair: Option<SentencePair>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PiSession {
    pub items: Vec<PiItem>,
    pub level: String,
    pub grammar_point: String,
}
