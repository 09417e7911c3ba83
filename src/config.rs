use anyhow::Result;
use serde::Deserialize;

// 配置文件结构
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub processing: ProcessingConfig,
    pub lesson: LessonConfig,
    pub database: DatabaseConfig,
    pub output: OutputConfig,
    pub input: InputConfig,
    pub tts: TtsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub openrouter_key: String,
    pub models: ModelConfig,
}

// 各步骤允许使用不同模型
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub decompose_model: String,
    pub split_model: String,
    pub vocab_model: String,
    pub exercise_model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProcessingConfig {
    pub concurrent_requests: usize,
    pub request_delay_ms: u64,
    pub max_retries: u32,
    pub request_timeout_seconds: u64,
}

// 课程参数
#[derive(Debug, Deserialize, Clone)]
pub struct LessonConfig {
    pub title: String,
    pub scenario: String, // 场景标识，音色名单按它存取
    pub target_language: String,
    pub target_duration_minutes: u32,
    pub min_core_items: usize,
    pub max_core_items: usize,
    pub speaker1_gender: String,
    pub speaker2_gender: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub db_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub lesson_file: String,
    pub cards_file: String,
    pub exercise_file: String,
    pub audio_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub dialogue_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TtsConfig {
    pub azure_speech_key: String,
    pub azure_speech_region: String,
}

impl Config {
    pub fn load() -> Result<Config> {
        let config_content = std::fs::read_to_string("config.toml")
            .map_err(|_| anyhow::anyhow!("配置文件 config.toml 不存在或无法读取"))?;
        let config: Config = toml::from_str(&config_content)
            .map_err(|e| anyhow::anyhow!("配置文件解析失败: {}", e))?;
        Ok(config)
    }
}
