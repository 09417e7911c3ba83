use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::models::{Lesson, SpeakerVoice};

pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    pub async fn new(config: &Config) -> Result<Self> {
        // 创建数据库文件路径
        let db_path = std::env::current_dir()?.join(&config.database.db_file);
        let db_url = format!("sqlite:{}", db_path.display());

        println!("💾 连接数据库: {}", db_path.display());

        // 如果数据库文件不存在，先创建一个空文件
        if !db_path.exists() {
            std::fs::File::create(&db_path)?;
            println!("✨ 创建新数据库文件: {}", db_path.display());
        }

        let pool = SqlitePool::connect(&db_url).await?;

        let manager = DatabaseManager { pool };
        manager.initialize_tables().await?;

        Ok(manager)
    }

    async fn initialize_tables(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lessons (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                language TEXT NOT NULL,
                scenario TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at DATETIME DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // 同一场景里说话人的音色要跨课程保持一致
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS speaker_voices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                scenario TEXT NOT NULL,
                speaker_name TEXT NOT NULL,
                voice_id TEXT NOT NULL,
                UNIQUE(scenario, speaker_name)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // 保存成品课程，整个课程以 JSON 存一行
    pub async fn save_lesson(&self, scenario: &str, lesson: &Lesson) -> Result<i64> {
        let content = serde_json::to_string(lesson)
            .map_err(|e| anyhow::anyhow!("课程序列化失败: {}", e))?;

        let result = sqlx::query(
            "INSERT INTO lessons (title, language, scenario, content) VALUES (?, ?, ?, ?)",
        )
        .bind(&lesson.title)
        .bind(&lesson.language)
        .bind(scenario)
        .bind(&content)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    // 取出某场景已知的说话人音色名单
    pub async fn get_voice_roster(&self, scenario: &str) -> Result<Vec<SpeakerVoice>> {
        let roster = sqlx::query_as::<_, SpeakerVoice>(
            "SELECT speaker_name, voice_id FROM speaker_voices WHERE scenario = ? ORDER BY id",
        )
        .bind(scenario)
        .fetch_all(&self.pool)
        .await?;

        Ok(roster)
    }

    // 把本次分配的音色写回名单
    pub async fn save_voice_assignments(
        &self,
        scenario: &str,
        assignments: &[SpeakerVoice],
    ) -> Result<()> {
        for assignment in assignments {
            sqlx::query(
                "INSERT OR REPLACE INTO speaker_voices (scenario, speaker_name, voice_id) VALUES (?, ?, ?)",
            )
            .bind(scenario)
            .bind(&assignment.speaker_name)
            .bind(&assignment.voice_id)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

// 生成操练卡片文件（CSV，可直接导入 Anki）：
// 核心条目一张卡，每个重点词汇一张卡
pub fn generate_lesson_cards(lesson: &Lesson, output_file: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_file)
        .map_err(|e| anyhow::anyhow!("无法创建卡片文件 {}: {}", output_file, e))?;

    writer.write_record(["front", "reading", "back", "tag"])?;

    for item in &lesson.core_items {
        writer.write_record([
            item.text.as_str(),
            item.reading.as_deref().unwrap_or(""),
            item.translation.as_str(),
            "core",
        ])?;
    }

    for exchange in &lesson.exchanges {
        for word in &exchange.vocabulary {
            writer.write_record([
                word.text.as_str(),
                word.reading.as_deref().unwrap_or(""),
                word.translation.as_str(),
                word.proficiency_tag.as_deref().unwrap_or("vocab"),
            ])?;
        }
    }

    writer.flush()?;
    println!("✅ 操练卡片已生成：{}", output_file);
    Ok(())
}
