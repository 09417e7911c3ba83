// 目标语言策略表。过滤词表和自然度标记只为日语完整整理过，
// 其他语言是可扩展的表项：没有停用词表的语言在词汇过滤时直接放行

#[derive(Debug)]
pub struct LanguagePolicy {
    pub code: &'static str,
    pub logographic: bool,
    pub stopwords: &'static [&'static str],
    pub naturalness_markers: &'static [&'static str],
}

// 助词、系动词、极常用指示词/代词和最常见的动词。
// 这些词在对话里随处可见，单独操练没有价值
const JA_STOPWORDS: &[&str] = &[
    "は", "が", "を", "に", "で", "と", "も", "の", "へ", "や", "か", "から", "まで",
    "です", "だ", "である", "でした", "ます",
    "これ", "それ", "あれ", "この", "その", "あの", "ここ", "そこ", "あそこ",
    "私", "あなた", "彼", "彼女",
    "する", "なる", "ある", "いる", "行く", "来る", "言う", "思う", "見る",
];

// 句末语气词和礼貌标记
const JA_MARKERS: &[&str] = &["ね", "よ", "わ", "でしょう", "ましょう", "かな"];

static JA: LanguagePolicy = LanguagePolicy {
    code: "ja",
    logographic: true,
    stopwords: JA_STOPWORDS,
    naturalness_markers: JA_MARKERS,
};

static ZH: LanguagePolicy = LanguagePolicy {
    code: "zh",
    logographic: true,
    stopwords: &[],
    naturalness_markers: &[],
};

static ES: LanguagePolicy = LanguagePolicy {
    code: "es",
    logographic: false,
    stopwords: &[],
    naturalness_markers: &[],
};

static DEFAULT: LanguagePolicy = LanguagePolicy {
    code: "",
    logographic: false,
    stopwords: &[],
    naturalness_markers: &[],
};

pub fn policy_for(code: &str) -> &'static LanguagePolicy {
    match code {
        "ja" => &JA,
        "zh" => &ZH,
        "es" => &ES,
        _ => &DEFAULT,
    }
}

// CJK 统一表意文字（含扩展A）
pub fn is_logograph(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}')
}

pub fn logograph_count(text: &str) -> usize {
    text.chars().filter(|&c| is_logograph(c)).count()
}

// 平假名或片假名
pub fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// 短语的"单位数"：表意文字语言按字符算，其他语言按空白分词算
pub fn unit_count(text: &str, policy: &LanguagePolicy) -> usize {
    if policy.logographic {
        text.chars().filter(|c| !c.is_whitespace()).count()
    } else {
        word_count(text)
    }
}

// 句末标点数量（两种书写系统都认）
pub fn terminal_mark_count(text: &str) -> usize {
    text.chars()
        .filter(|c| matches!(c, '。' | '．' | '.' | '！' | '!' | '？' | '?'))
        .count()
}

pub fn is_interrogative(text: &str) -> bool {
    let trimmed = text.trim_end();
    trimmed.ends_with('？') || trimmed.ends_with('?')
}

// 句末是否带语气词/礼貌标记（先剥掉结尾标点再看）
pub fn has_naturalness_marker(text: &str, policy: &LanguagePolicy) -> bool {
    let trimmed: &str = text.trim_end_matches(|c: char| {
        c.is_whitespace() || matches!(c, '。' | '．' | '.' | '！' | '!' | '？' | '?')
    });
    policy
        .naturalness_markers
        .iter()
        .any(|marker| trimmed.ends_with(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_count_by_script() {
        let ja = policy_for("ja");
        let es = policy_for("es");
        assert_eq!(unit_count("コーヒーをください", ja), 9);
        assert_eq!(unit_count("un café por favor", es), 4);
    }

    #[test]
    fn counts_terminal_marks_in_both_scripts() {
        assert_eq!(terminal_mark_count("田中さんは元気です。今日は晴れです。"), 2);
        assert_eq!(terminal_mark_count("そうですか？"), 1);
        assert_eq!(terminal_mark_count("Hola. Buenos días."), 2);
        assert_eq!(terminal_mark_count("こんにちは"), 0);
    }

    #[test]
    fn detects_sentence_final_markers() {
        let ja = policy_for("ja");
        assert!(has_naturalness_marker("いい天気ですね。", ja));
        assert!(has_naturalness_marker("行きましょう！", ja));
        assert!(!has_naturalness_marker("行きます。", ja));
        // ね在句中不算
        assert!(!has_naturalness_marker("ねこがいます。", ja));
    }

    #[test]
    fn logograph_and_kana_classification() {
        assert_eq!(logograph_count("田中さんは元気です"), 4);
        assert!(is_kana('ね'));
        assert!(is_kana('カ'));
        assert!(!is_kana('水'));
    }

    #[test]
    fn unknown_language_gets_passthrough_policy() {
        let policy = policy_for("fr");
        assert!(!policy.logographic);
        assert!(policy.stopwords.is_empty());
    }
}
