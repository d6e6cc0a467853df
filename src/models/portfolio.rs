use super::common::{ensure_not_blank, ensure_unique_ids};
use crate::error::AppResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PORTFOLIO_IMAGE: &str = "/portfolio/default.jpg";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_image: Option<String>,
    pub image_url: String,
    pub category: String,
    pub program: String,
    pub duration: String,
    #[serde(default)]
    pub results: Vec<String>,
    pub date: String,
}

/// 后台表单提交的作品集内容；`results` 为逗号分隔的文本
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioForm {
    pub title: String,
    pub description: String,
    pub program: String,
    pub duration: String,
    pub results: String,
    pub before_image: Option<String>,
    pub after_image: Option<String>,
}

/// 拆分逗号分隔的成果列表，去掉空白项
pub fn parse_results(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Portfolio {
    pub fn validate_list(items: &[Portfolio]) -> AppResult<()> {
        ensure_unique_ids(items, |p| p.id, "portfolio")?;
        items
            .iter()
            .try_for_each(|p| ensure_not_blank(&p.title, "title"))
    }

    /// 根据表单构建作品集：封面使用 before 图，分类沿用项目名
    pub fn from_form(id: i64, form: PortfolioForm, date: String) -> Self {
        let before = form
            .before_image
            .unwrap_or_else(|| DEFAULT_PORTFOLIO_IMAGE.to_string());
        let after = form
            .after_image
            .unwrap_or_else(|| DEFAULT_PORTFOLIO_IMAGE.to_string());
        Self {
            id,
            title: form.title,
            description: form.description,
            image_url: before.clone(),
            before_image: Some(before),
            after_image: Some(after),
            category: form.program.clone(),
            program: form.program,
            duration: form.duration,
            results: parse_results(&form.results),
            date,
        }
    }

    pub fn seed() -> Vec<Portfolio> {
        let entry = |id: i64, title: &str, description: &str, program: &str, duration: &str, results: &[&str], date: &str| {
            Portfolio {
                id,
                title: title.to_string(),
                description: description.to_string(),
                before_image: Some("/api/placeholder/300/400".to_string()),
                after_image: Some("/api/placeholder/300/400".to_string()),
                image_url: "/api/placeholder/300/400".to_string(),
                category: program.to_string(),
                program: program.to_string(),
                duration: duration.to_string(),
                results: results.iter().map(|s| s.to_string()).collect(),
                date: date.to_string(),
            }
        };
        vec![
            entry(
                1,
                "김민지님의 다이어트 성공 스토리",
                "6개월간의 체계적인 다이어트 프로그램을 통해 15kg 감량에 성공하셨습니다.",
                "다이어트",
                "6개월",
                &["15kg 감량", "체지방률 12% 감소", "근육량 유지"],
                "2024-01-15",
            ),
            entry(
                2,
                "박준호님의 벌크업 성공 사례",
                "4개월간의 집중적인 벌크업 프로그램으로 근육량 8kg 증가를 달성하셨습니다.",
                "벌크업",
                "4개월",
                &["근육량 8kg 증가", "체중 12kg 증가", "벤치프레스 30kg 향상"],
                "2024-01-10",
            ),
            entry(
                3,
                "이서연님의 자세교정 개선 후기",
                "장시간 책상 업무로 인한 거북목과 라운드숄더가 크게 개선되었습니다.",
                "자세교정",
                "3개월",
                &["거북목 20도 개선", "어깨 균형 교정", "요통 완화"],
                "2024-01-05",
            ),
            entry(
                4,
                "정미영님의 산후관리 성공 케이스",
                "출산 후 변화된 체형을 건강하게 회복했습니다.",
                "산후관리",
                "5개월",
                &["출산 전 체중 회복", "복부 근력 강화", "전신 체력 향상"],
                "2024-01-01",
            ),
            entry(
                5,
                "최현우님의 웨딩 PT 완성",
                "결혼식을 앞두고 3개월간 집중 관리를 통해 완벽한 웨딩 바디를 완성했습니다.",
                "웨딩 PT",
                "3개월",
                &["체지방 8% 감소", "어깨 라인 완성", "전체적인 체형 개선"],
                "2023-12-25",
            ),
            entry(
                6,
                "홍길동님의 재활운동 회복 과정",
                "무릎 수술 후 재활 과정을 거쳐 완전한 일상 복귀에 성공했습니다.",
                "재활운동",
                "4개월",
                &["무릎 기능 100% 회복", "근력 90% 회복", "일상생활 완전 복귀"],
                "2023-12-20",
            ),
        ]
    }
}
