use anyhow::Result;

use crate::api::ApiClient;
use crate::config::Config;
use crate::database::{DatabaseManager, generate_lesson_cards};
use crate::decompose;
use crate::dialogue;
use crate::exercise;
use crate::extractor::ExtractionPipeline;
use crate::grammar_points;
use crate::job::JobProgress;
use crate::language;
use crate::models::{Lesson, PiSession};
use crate::scorer;
use crate::tts::{AzureTts, TtsConfig};

pub struct LessonCreator {
    decompose_client: ApiClient,
    split_client: ApiClient,
    vocab_client: ApiClient,
    exercise_client: ApiClient,
    db_manager: DatabaseManager,
    pub config: Config,
}

impl LessonCreator {
    pub async fn new(config: Config) -> Result<Self> {
        let decompose_client = ApiClient::new(config.clone(), &config.api.models.decompose_model)?;
        let split_client = ApiClient::new(config.clone(), &config.api.models.split_model)?;
        let vocab_client = ApiClient::new(config.clone(), &config.api.models.vocab_model)?;
        let exercise_client = ApiClient::new(config.clone(), &config.api.models.exercise_model)?;
        let db_manager = DatabaseManager::new(&config).await?;

        Ok(LessonCreator {
            decompose_client,
            split_client,
            vocab_client,
            exercise_client,
            db_manager,
            config,
        })
    }

    // 完整课程流水线：台本 → 核心条目 + 对话交换 → 保存、导出
    pub async fn build_lesson(&self, progress: &JobProgress) -> Result<Lesson> {
        println!("📖 读取台本: {}", self.config.input.dialogue_file);
        let sentences = dialogue::load_script(&self.config.input.dialogue_file)?;
        println!("📝 共 {} 条台词", sentences.len());

        let policy = language::policy_for(&self.config.lesson.target_language);
        progress.set(5);

        println!("🔄 第一步：选出核心操练短语...");
        let selected = scorer::select_core(
            &sentences,
            policy,
            self.config.lesson.min_core_items,
            self.config.lesson.max_core_items,
        )?;
        println!("  🎯 选出 {} 个核心短语", selected.len());
        progress.set(15);

        println!("🔄 第二步：倒序构建分解...");
        let core_items = decompose::build_core_items(&self.decompose_client, selected, policy).await;
        progress.set(45);

        println!("🔄 第三步：提取对话交换...");
        let roster = self.db_manager.get_voice_roster(&self.config.lesson.scenario).await?;
        if !roster.is_empty() {
            println!("  🎤 场景已有 {} 个说话人音色", roster.len());
        }

        let pipeline = ExtractionPipeline::new(
            &self.split_client,
            &self.vocab_client,
            policy,
            self.config.processing.concurrent_requests,
        );
        let extraction = pipeline
            .extract(
                &sentences,
                self.config.lesson.target_duration_minutes,
                (
                    &self.config.lesson.speaker1_gender,
                    &self.config.lesson.speaker2_gender,
                ),
                &roster,
            )
            .await?;
        progress.set(85);

        let lesson = Lesson {
            title: self.config.lesson.title.clone(),
            language: self.config.lesson.target_language.clone(),
            core_items,
            exchanges: extraction.exchanges,
            created_at: chrono::Utc::now(),
        };

        println!("💾 保存课程与音色名单...");
        let lesson_id = self
            .db_manager
            .save_lesson(&self.config.lesson.scenario, &lesson)
            .await?;
        self.db_manager
            .save_voice_assignments(&self.config.lesson.scenario, &extraction.voice_assignments)
            .await?;
        println!("  ✅ 课程已保存 (ID: {})", lesson_id);

        let lesson_json = serde_json::to_string_pretty(&lesson)?;
        std::fs::write(&self.config.output.lesson_file, lesson_json)
            .map_err(|e| anyhow::anyhow!("无法写入课程文件 {}: {}", self.config.output.lesson_file, e))?;
        println!("📄 课程文件已生成：{}", self.config.output.lesson_file);

        generate_lesson_cards(&lesson, &self.config.output.cards_file)?;
        progress.set(100);

        Ok(lesson)
    }

    // 语法练习生成。这条路不降级：失败直接向上抛
    pub async fn generate_exercise(&self, grammar_point: &str, level: &str) -> Result<PiSession> {
        println!("🔄 生成语法练习: {} ({})", grammar_point, level);
        if let Some(meta) = grammar_points::metadata_for(grammar_point) {
            println!("  📚 {} — {}", meta.name, meta.description);
        }

        let session = exercise::generate_session(
            &self.exercise_client,
            grammar_point,
            level,
            exercise::DEFAULT_ITEM_COUNT,
        )
        .await?;
        println!("  ✅ 生成 {} 道题", session.items.len());

        let session_json = serde_json::to_string_pretty(&session)?;
        std::fs::write(&self.config.output.exercise_file, session_json)
            .map_err(|e| anyhow::anyhow!("无法写入练习文件 {}: {}", self.config.output.exercise_file, e))?;
        println!("📄 练习文件已生成：{}", self.config.output.exercise_file);

        Ok(session)
    }

    /// 增量生成对话交换的音频文件
    pub async fn generate_missing_audio(&self) -> Result<()> {
        println!("🎵 开始增量生成音频文件...");

        let content = std::fs::read_to_string(&self.config.output.lesson_file)
            .map_err(|e| anyhow::anyhow!("无法读取课程文件 {}: {}", self.config.output.lesson_file, e))?;
        let lesson: Lesson = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("课程文件解析失败: {}", e))?;

        std::fs::create_dir_all(&self.config.output.audio_dir)
            .map_err(|e| anyhow::anyhow!("无法创建音频目录 {}: {}", self.config.output.audio_dir, e))?;

        let tts = AzureTts::new(TtsConfig::from_config(&self.config.tts));

        let mut generated = 0;
        let mut skipped = 0;
        for exchange in &lesson.exchanges {
            let filename = format!("exchange_{:03}.wav", exchange.order);
            let path = std::path::Path::new(&self.config.output.audio_dir).join(&filename);

            if path.exists() {
                skipped += 1;
                continue;
            }

            println!("  🎵 生成音频 {} ({}): {}", filename, exchange.voice_id, exchange.text);
            // 有假名读音就读读音，没有就读原文
            let text = exchange.reading.as_deref().unwrap_or(&exchange.text);
            tts.synthesize_to_file(text, &exchange.voice_id, &path.to_string_lossy())
                .await?;
            generated += 1;
        }

        println!("🎉 音频生成完成：新增 {} 个，已存在 {} 个", generated, skipped);
        println!("   📁 音频文件目录: {}", self.config.output.audio_dir);
        Ok(())
    }
}
