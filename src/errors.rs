use thiserror::Error;

// 管线的"响亮失败"错误。可降级的路径（分解、拆句、词汇提取）不走这里，
// 它们退回更简单的产物并继续
#[derive(Debug, Error)]
pub enum LessonError {
    #[error("对话内容为空，无法生成课程")]
    EmptyDialogue,

    #[error("练习生成失败: {0}")]
    Generation(#[from] anyhow::Error),
}
