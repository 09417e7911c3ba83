use anyhow::Result;

use lesson_creator::job;
use lesson_creator::{Config, LessonCreator};

#[tokio::main]
async fn main() -> Result<()> {
    println!("🎧 会话课程生成器");

    let config = Config::load()?;
    let creator = LessonCreator::new(config).await?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("exercise") => {
            // 用法: lesson-creator exercise [语法点] [等级]
            let point = args.get(2).map(|s| s.as_str()).unwrap_or("ha_vs_ga");
            let level = args.get(3).map(|s| s.as_str()).unwrap_or("N5");
            creator.generate_exercise(point, level).await?;
        }
        Some("audio") => {
            creator.generate_missing_audio().await?;
        }
        _ => {
            build_with_progress(&creator).await?;
        }
    }

    println!("\n🎉 完成！");
    Ok(())
}

// 课程构建按后台任务的契约跑：提交一次，按秒轮询进度，
// 进度值只用来挑选展示阶段
async fn build_with_progress(creator: &LessonCreator) -> Result<()> {
    let (progress, watcher) = job::job_channel();

    let printer = tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        let mut last_phase = None;
        loop {
            interval.tick().await;
            let phase = job::phase_for_progress(watcher.progress());
            if last_phase != Some(phase) {
                println!("⏱️  {}", job::phase_message(phase));
                last_phase = Some(phase);
            }
            if watcher.is_done() {
                break;
            }
        }
    });

    let result = creator.build_lesson(&progress).await;
    progress.set(100);
    printer.await?;

    let lesson = result?;
    println!(
        "\n📊 课程统计：{} 个核心条目，{} 个对话交换",
        lesson.core_items.len(),
        lesson.exchanges.len()
    );
    println!("   📄 {} - 课程内容", creator.config.output.lesson_file);
    println!("   📄 {} - 操练卡片", creator.config.output.cards_file);

    Ok(())
}
