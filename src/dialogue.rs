use anyhow::Result;

use crate::models::{RawSentence, SpeakerRef};

// 台本格式：每行一条台词
//   名前（関係）: 台词 | 中文翻译 | 假名读音
// 关系和读音可省略；冒号支持全角半角；# 开头的行是注释

pub fn load_script(path: &str) -> Result<Vec<RawSentence>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("无法读取台本文件 {}: {}", path, e))?;
    Ok(parse_script(&content))
}

pub fn parse_script(content: &str) -> Vec<RawSentence> {
    let mut sentences = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (speaker, rest) = split_speaker(line);

        let mut fields = rest.split('|').map(str::trim);
        let text = fields.next().unwrap_or("").to_string();
        if text.is_empty() {
            continue;
        }
        let translation = fields.next().unwrap_or("").to_string();
        let reading = fields.next().filter(|r| !r.is_empty()).map(str::to_string);

        sentences.push(RawSentence {
            id: sentences.len(),
            text,
            translation,
            speaker,
            reading,
            kanji_count: None,
        });
    }

    sentences
}

// 行首的 "名前（関係）:" 部分。没有冒号的行整行当台词
fn split_speaker(line: &str) -> (Option<SpeakerRef>, &str) {
    let colon = match line.find('：').into_iter().chain(line.find(':')).min() {
        Some(pos) => pos,
        None => return (None, line),
    };

    let head = line[..colon].trim();
    let rest = line[colon + line[colon..].chars().next().map_or(1, |c| c.len_utf8())..].trim();

    if head.is_empty() {
        return (None, rest);
    }

    // 括号里是与对方的关系
    let (name, relationship) = match head.find(['（', '(']) {
        Some(open) => {
            let name = head[..open].trim();
            let rel = head[open..]
                .trim_start_matches(['（', '('])
                .trim_end_matches(['）', ')'])
                .trim();
            (name, rel)
        }
        None => (head, ""),
    };

    (
        Some(SpeakerRef {
            name: name.to_string(),
            relationship: relationship.to_string(),
        }),
        rest,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_line_with_relationship_and_reading() {
        let script = "田中（店員）: いらっしゃいませ。| 欢迎光临。| いらっしゃいませ";
        let sentences = parse_script(script);

        assert_eq!(sentences.len(), 1);
        let s = &sentences[0];
        assert_eq!(s.text, "いらっしゃいませ。");
        assert_eq!(s.translation, "欢迎光临。");
        assert_eq!(s.reading.as_deref(), Some("いらっしゃいませ"));
        let speaker = s.speaker.as_ref().unwrap();
        assert_eq!(speaker.name, "田中");
        assert_eq!(speaker.relationship, "店員");
    }

    #[test]
    fn fullwidth_colon_and_no_relationship() {
        let script = "佐藤：コーヒーをください。| 请给我咖啡。";
        let sentences = parse_script(script);

        let speaker = sentences[0].speaker.as_ref().unwrap();
        assert_eq!(speaker.name, "佐藤");
        assert_eq!(speaker.relationship, "");
        assert_eq!(sentences[0].text, "コーヒーをください。");
    }

    #[test]
    fn line_without_speaker_is_plain_text() {
        let script = "こんにちは。| 你好。";
        let sentences = parse_script(script);
        assert!(sentences[0].speaker.is_none());
        assert_eq!(sentences[0].text, "こんにちは。");
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let script = "# 咖啡店场景\n\n田中: はい。| 好的。\n";
        let sentences = parse_script(script);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].id, 0);
    }
}
