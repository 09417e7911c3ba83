use anyhow::Result;
use serde::de::DeserializeOwned;

// LLM 返回的文本按不可信输入处理：先去掉可能的代码围栏，
// 再截取最外层的 JSON，最后才交给 serde。四个组件共用这一层

// 去掉 ```json ... ``` 这样的围栏标记
pub fn strip_code_fences(content: &str) -> &str {
    let mut s = content.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // 围栏第一行可能带语言标记
        s = match rest.find('\n') {
            Some(pos) => &rest[pos + 1..],
            None => rest,
        };
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

// 截取最外层 JSON 对象
pub fn extract_json_object(content: &str) -> &str {
    let start = content.find('{').unwrap_or(0);
    let end = content.rfind('}').map(|i| i + 1).unwrap_or(content.len());
    if start < end { &content[start..end] } else { content }
}

// 截取最外层 JSON 数组
pub fn extract_json_array(content: &str) -> &str {
    let start = content.find('[').unwrap_or(0);
    let end = content.rfind(']').map(|i| i + 1).unwrap_or(content.len());
    if start < end { &content[start..end] } else { content }
}

pub fn parse_object<T: DeserializeOwned>(content: &str) -> Result<T> {
    let json_content = extract_json_object(strip_code_fences(content));
    serde_json::from_str(json_content)
        .map_err(|e| anyhow::anyhow!("解析 LLM 响应失败: {}\n响应内容: {}", e, json_content))
}

pub fn parse_array<T: DeserializeOwned>(content: &str) -> Result<Vec<T>> {
    let json_content = extract_json_array(strip_code_fences(content));
    serde_json::from_str(json_content)
        .map_err(|e| anyhow::anyhow!("解析 LLM 响应失败: {}\n响应内容: {}", e, json_content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LlmComponent, LlmSplitSentence};
    use std::collections::HashMap;

    #[test]
    fn strips_fenced_json() {
        let content = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(content), "{\"a\": 1}");

        // 没有围栏时原样返回
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn extracts_object_from_prose() {
        let content = "好的，结果如下：\n{\"0\": []}\n以上。";
        assert_eq!(extract_json_object(content), "{\"0\": []}");
    }

    #[test]
    fn parses_object_with_alias_keys() {
        // 字段拼写漂移：text/phrase、reading/kana、translation/meaning 都要接受
        let content = r#"```json
{"0": [{"phrase": "ください", "kana": "ください", "meaning": "请给我"}]}
```"#;
        let map: HashMap<String, Vec<LlmComponent>> = parse_object(content).unwrap();
        let comps = &map["0"];
        assert_eq!(comps[0].text, "ください");
        assert_eq!(comps[0].reading.as_deref(), Some("ください"));
        assert_eq!(comps[0].translation, "请给我");
    }

    #[test]
    fn parses_array_with_alias_keys() {
        let content = r#"回答：[{"sentence": "田中さんは元気です。", "meaning": "田中先生很好。"}]"#;
        let parts: Vec<LlmSplitSentence> = parse_array(content).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].text, "田中さんは元気です。");
    }

    #[test]
    fn rejects_non_json() {
        let result: Result<HashMap<String, Vec<LlmComponent>>> = parse_object("抱歉，我无法处理。");
        assert!(result.is_err());
    }
}
