use tokio::sync::watch;

// 后台任务进度契约：任务提交一次，调用方按秒轮询。
// progress 是 0-100 的提示值，只用来挑选展示给用户的阶段文案

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Early,
    Mid,
    Late,
}

pub fn phase_for_progress(progress: u8) -> JobPhase {
    match progress {
        0..=33 => JobPhase::Early,
        34..=66 => JobPhase::Mid,
        _ => JobPhase::Late,
    }
}

pub fn phase_message(phase: JobPhase) -> &'static str {
    match phase {
        JobPhase::Early => "正在分析对话…",
        JobPhase::Mid => "正在生成课程内容…",
        JobPhase::Late => "正在完成最后整理…",
    }
}

// 生产端：管线在阶段边界上报进度
#[derive(Debug)]
pub struct JobProgress {
    tx: watch::Sender<u8>,
}

impl JobProgress {
    pub fn set(&self, progress: u8) {
        let _ = self.tx.send(progress.min(100));
    }
}

// 消费端：调用方轮询读取
#[derive(Debug, Clone)]
pub struct JobWatcher {
    rx: watch::Receiver<u8>,
}

impl JobWatcher {
    pub fn progress(&self) -> u8 {
        *self.rx.borrow()
    }

    pub fn is_done(&self) -> bool {
        self.progress() >= 100
    }
}

pub fn job_channel() -> (JobProgress, JobWatcher) {
    let (tx, rx) = watch::channel(0);
    (JobProgress { tx }, JobWatcher { rx })
}
