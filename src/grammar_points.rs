// 语法点分类表。手工整理的静态表，不在运行时推导；
// 查询都是纯表查找，可以并发只读

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarPointMeta {
    pub id: &'static str,
    pub name: &'static str,
    pub level: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

pub const LEVELS: &[&str] = &["N5", "N4", "N3", "N2", "N1"];

pub const GRAMMAR_POINTS: &[GrammarPointMeta] = &[
    GrammarPointMeta {
        id: "ha_vs_ga",
        name: "は与が",
        level: "N5",
        category: "助词对比",
        description: "主题标记は与主语标记が：话题的延续与新信息的引入",
    },
    GrammarPointMeta {
        id: "ni_vs_de",
        name: "に与で",
        level: "N5",
        category: "场所助词",
        description: "存在场所的に与动作发生场所的で",
    },
    GrammarPointMeta {
        id: "ni_vs_he",
        name: "に与へ",
        level: "N5",
        category: "方向助词",
        description: "到达点的に与单纯方向的へ",
    },
    GrammarPointMeta {
        id: "wo_vs_ga",
        name: "を与が",
        level: "N4",
        category: "格助词",
        description: "他动词宾语的を与愿望、可能表达里对象的が",
    },
    GrammarPointMeta {
        id: "te_iru_vs_ta",
        name: "ている与た",
        level: "N4",
        category: "体貌",
        description: "ている的持续/结果状态与た的单纯完成",
    },
    GrammarPointMeta {
        id: "kara_vs_node",
        name: "から与ので",
        level: "N4",
        category: "原因表达",
        description: "主观理由的から与客观缘由的ので",
    },
    GrammarPointMeta {
        id: "ba_vs_tara",
        name: "ば与たら",
        level: "N3",
        category: "条件表达",
        description: "一般条件的ば与既定/偶发条件的たら",
    },
    GrammarPointMeta {
        id: "sou_vs_you",
        name: "そう与よう",
        level: "N3",
        category: "样态推测",
        description: "直观印象的そう与据情推断的よう",
    },
    GrammarPointMeta {
        id: "rareru_passive_vs_potential",
        name: "られる：被动与可能",
        level: "N3",
        category: "动词形态",
        description: "同形的られる在被动和可能两种解读间的区分",
    },
    GrammarPointMeta {
        id: "noni_vs_kedo",
        name: "のに与けど",
        level: "N2",
        category: "逆接",
        description: "带意外、不满色彩的のに与中立转折的けど",
    },
    GrammarPointMeta {
        id: "hazu_vs_beki",
        name: "はず与べき",
        level: "N2",
        category: "情态",
        description: "有根据的预期はず与义务劝告的べき",
    },
];

pub fn metadata_for(id: &str) -> Option<&'static GrammarPointMeta> {
    GRAMMAR_POINTS.iter().find(|point| point.id == id)
}

pub fn points_for_level(level: &str) -> Vec<&'static GrammarPointMeta> {
    GRAMMAR_POINTS.iter().filter(|point| point.level == level).collect()
}

pub fn is_valid_for_level(id: &str, level: &str) -> bool {
    metadata_for(id).is_some_and(|point| point.level == level)
}

// 各等级允许使用的词汇范围，随等级单调放宽
pub fn vocabulary_ceiling(level: &str) -> &'static str {
    match level {
        "N5" => "只使用 JLPT N5 范围的基础词汇（约800词）：寒暄、数字、家族、饮食、天气、时间、简单动词",
        "N4" => "可使用 N5-N4 范围词汇（约1500词）：日常生活、购物、交通、简单工作场景",
        "N3" => "可使用 N5-N3 范围词汇（约3700词）：一般社会话题、职场交流、情感表达",
        "N2" => "可使用 N5-N2 范围词汇（约6000词）：新闻报道、正式场合、抽象概念",
        _ => "词汇不设上限，可使用书面语、惯用句和抽象词汇",
    }
}

// 语法点专属的出题指引。按 id 派发到各自的指引构建函数；
// 未知 id 回落到 は/が 的主题-主语对比指引
pub fn guidance_for(id: &str) -> String {
    match id {
        "ha_vs_ga" => ha_vs_ga_guidance(),
        "ni_vs_de" => ni_vs_de_guidance(),
        "ni_vs_he" => ni_vs_he_guidance(),
        "wo_vs_ga" => wo_vs_ga_guidance(),
        "te_iru_vs_ta" => te_iru_vs_ta_guidance(),
        "kara_vs_node" => kara_vs_node_guidance(),
        "ba_vs_tara" => ba_vs_tara_guidance(),
        "sou_vs_you" => sou_vs_you_guidance(),
        "rareru_passive_vs_potential" => rareru_guidance(),
        "noni_vs_kedo" => noni_vs_kedo_guidance(),
        "hazu_vs_beki" => hazu_vs_beki_guidance(),
        _ => {
            println!("  ⚠️  未知语法点 {}，使用默认的は/が指引", id);
            ha_vs_ga_guidance()
        }
    }
}

fn ha_vs_ga_guidance() -> String {
    r#"考查学习者能否靠は/が的选择判断句子在说谁、说什么。

硬性结构规则：两个候选指称对象都必须出现在主句里，不能只出现在背景句里。

最小对示例：
- 「田中さんは山田さんが呼んだ」→ 呼人的是山田
- 「田中さんが山田さんを呼んだ」→ 呼人的是田中
问题：「誰が呼びましたか」——答案只能从助词判断。

任务模板：
1. 指称判断：主句里有两个人物，问"做某事的是谁"
2. 新旧信息：给一问一答，让学习者选哪个回答自然（が引入新信息）
3. 对比主题：「AはXですが、BはYです」问某属性属于谁"#.to_string()
}

fn ni_vs_de_guidance() -> String {
    r#"考查学习者能否靠に/で判断句子描述的是"存在于某处"还是"在某处做事"。

硬性结构规则：两个候选场所（或两种解读对应的动词短语）都必须出现在主句里。

最小对示例：
- 「公園にいます」→ 人在公园（存在）
- 「公園で食べます」→ 吃饭的地点是公园（动作）
问题：「この人は何をしていますか」或「どこにいますか」。

任务模板：
1. 场景判断：主句含两个场所名词，问动作发生在哪里
2. 解读选择：同一场所 + に/で，问句子在说"在那里"还是"在那里做"
"#.to_string()
}

fn ni_vs_he_guidance() -> String {
    r#"考查学习者能否分辨"到达点"与"单纯方向"。

硬性结构规则：两个候选目的地都必须出现在主句里。

最小对示例：
- 「駅に行きます」→ 以车站为到达点
- 「駅の方へ歩きます」→ 朝车站方向走，不一定到

任务模板：
1. 目的地判断：主句含两个地点，问说话人最终要到哪里
2. 含义区分：问句子强调"到达"还是"方向""#.to_string()
}

fn wo_vs_ga_guidance() -> String {
    r#"考查学习者能否靠を/が分辨动作宾语与愿望、可能的对象。

硬性结构规则：两个候选对象名词都必须出现在主句里。

最小对示例：
- 「寿司を食べます」→ 客观陈述吃寿司
- 「寿司が食べたいです」→ 想吃的对象是寿司
问题：「この人は今どんな気持ちですか」或「何を食べますか」。

任务模板：
1. 对象判断：主句里有两个名词，问愿望/能力指向哪一个
2. 态度判断：问句子是客观陈述还是表达愿望"#.to_string()
}

fn te_iru_vs_ta_guidance() -> String {
    r#"考查学习者能否靠ている/た判断事件是"正在/结果持续"还是"已经完结"。

硬性结构规则：时间或状态的两个候选解读都要能从主句文本里找到对应词语。

最小对示例：
- 「窓が開いています」→ 窗户现在开着（结果状态）
- 「窓が開きました」→ 窗户刚才开了（完成）
问题：「今、窓はどうなっていますか」。

任务模板：
1. 现状判断：问"现在"的状态，两个选项分别对应持续和完结
2. 时间线排序：给两句话，问哪件事还在进行"#.to_string()
}

fn kara_vs_node_guidance() -> String {
    r#"考查学习者能否分辨主观理由（から）与客观缘由（ので）带来的语气差异。

硬性结构规则：原因和结果两部分都必须出现在主句里，候选选项取自这两部分。

最小对示例：
- 「危ないから、やめてください」→ 带主观强调的警告
- 「工事中なので、通れません」→ 客观说明

任务模板：
1. 因果定位：问"为什么"，选项都取自主句文本
2. 语气判断：问说话人是在强硬要求还是礼貌说明"#.to_string()
}

fn ba_vs_tara_guidance() -> String {
    r#"考查学习者能否靠ば/たら分辨一般条件与既定、偶发条件。

硬性结构规则：条件和结果的关键词都必须出现在主句里。

最小对示例：
- 「安ければ、買います」→ 一般条件：只要便宜就买
- 「家に帰ったら、電話します」→ 先回家，之后打电话（时序）
问题：「この人はいつ電話しますか」。

任务模板：
1. 时序判断：问哪件事先发生
2. 条件判断：问结果在什么情况下成立"#.to_string()
}

fn sou_vs_you_guidance() -> String {
    r#"考查学习者能否分辨"看上去（直观印象）"与"似乎（据情推断）"。

硬性结构规则：推测的对象和依据都必须出现在主句里。

最小对示例：
- 「雨が降りそうです」→ 看天色要下雨（直观）
- 「雨が降ったようです」→ 地面湿了，推断下过雨
问题：「今、外はどうですか」。

任务模板：
1. 时点判断：问事情是"将要发生"还是"已经发生"
2. 依据判断：问说话人是亲眼所见还是推断"#.to_string()
}

fn rareru_guidance() -> String {
    r#"考查学习者能否在语境里分辨られる的被动解读与可能解读。

硬性结构规则：两种解读的关键参与者都必须出现在主句里。

最小对示例：
- 「先生に褒められました」→ 被老师表扬（被动，に标记施事）
- 「この漢字が読められますか」之类的混淆应避免；可能态用「読めます」
  或「食べられます」：「刺身が食べられます」→ 能吃生鱼片
问题：「この人に何がありましたか」。

任务模板：
1. 解读判断：问句子在说"被……"还是"能……"
2. 施事定位：被动句里问动作是谁做的"#.to_string()
}

fn noni_vs_kedo_guidance() -> String {
    r#"考查学习者能否感知のに带的意外、不满色彩与けど的中立转折。

硬性结构规则：转折的两个分句内容都必须出现在主句里。

最小对示例：
- 「薬を飲んだのに、治りません」→ 吃了药却不见好（不满）
- 「薬を飲んだけど、治りません」→ 中立陈述
问题：「この人はどんな気持ちですか」。

任务模板：
1. 情绪判断：问说话人是否带着不满或意外
2. 预期判断：问哪句隐含"本来应该好了""#.to_string()
}

fn hazu_vs_beki_guidance() -> String {
    r#"考查学习者能否分辨"按理应该（预期）"与"理应去做（义务）"。

硬性结构规则：预期/义务涉及的动作和主体都必须出现在主句里。

最小对示例：
- 「彼はもう着いたはずです」→ 有根据的推断：他应该到了
- 「彼はもっと早く出発すべきです」→ 劝告：他应该早点出发
问题：「話している人は何を伝えたいですか」。

任务模板：
1. 含义判断：问句子是推断事实还是提出要求
2. 根据判断：预期句里问说话人凭什么这么想"#.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_point_has_exactly_one_level() {
        for point in GRAMMAR_POINTS {
            assert!(LEVELS.contains(&point.level), "{} 的等级无效", point.id);
        }
        // id 不重复
        let mut ids: Vec<&str> = GRAMMAR_POINTS.iter().map(|p| p.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), GRAMMAR_POINTS.len());
    }

    #[test]
    fn metadata_lookup() {
        let meta = metadata_for("ha_vs_ga").unwrap();
        assert_eq!(meta.level, "N5");
        assert_eq!(meta.name, "は与が");
        assert!(metadata_for("zentai_teki").is_none());
    }

    #[test]
    fn points_for_level_filters_by_level() {
        let n5 = points_for_level("N5");
        assert!(!n5.is_empty());
        assert!(n5.iter().all(|p| p.level == "N5"));
        assert!(points_for_level("N1").is_empty() || points_for_level("N1").iter().all(|p| p.level == "N1"));
    }

    #[test]
    fn level_validation() {
        assert!(is_valid_for_level("ha_vs_ga", "N5"));
        assert!(!is_valid_for_level("ha_vs_ga", "N3"));
        assert!(!is_valid_for_level("unknown_point", "N5"));
    }

    #[test]
    fn unknown_point_falls_back_to_default_guidance() {
        assert_eq!(guidance_for("unknown_point"), guidance_for("ha_vs_ga"));
    }

    #[test]
    fn every_point_has_guidance_with_structure_rule() {
        for point in GRAMMAR_POINTS {
            let guidance = guidance_for(point.id);
            assert!(guidance.contains("硬性结构规则"), "{} 缺少结构规则", point.id);
            assert!(guidance.contains("任务模板"), "{} 缺少任务模板", point.id);
        }
    }

    #[test]
    fn vocabulary_ceiling_is_defined_for_all_levels() {
        for level in LEVELS {
            assert!(!vocabulary_ceiling(level).is_empty());
        }
    }
}
