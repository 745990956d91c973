use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::types::{Axis, MaskTypeCode};
use crate::Error;

/// 4軸の呼び名 (例: Sunny / Front / Close / Persistent)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxesSummary {
    pub tension: String,
    pub position: String,
    pub distance: String,
    pub work: String,
}

impl AxesSummary {
    pub fn of(code: MaskTypeCode) -> Self {
        let [tension, position, distance, work] = code.poles().map(|pole| pole.label().to_string());
        Self {
            tension,
            position,
            distance,
            work,
        }
    }

    pub fn get(&self, axis: Axis) -> &str {
        match axis {
            Axis::Tension => &self.tension,
            Axis::Position => &self.position,
            Axis::Distance => &self.distance,
            Axis::Work => &self.work,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    #[serde(default)]
    pub good: Vec<String>,
    #[serde(default)]
    pub moderate: Vec<String>,
    #[serde(default)]
    pub challenging: Vec<String>,
}

/// タイプの特徴・行動・リスク・相性
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDetails {
    #[serde(default)]
    pub characteristics: Vec<String>,
    #[serde(default)]
    pub behaviors: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    pub compatibility: Option<Compatibility>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSection {
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSection {
    pub description: String,
    pub examples: Vec<String>,
}

/// 同僚・部下・リーダーとしての振る舞い
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkplaceHabits {
    pub colleague: HabitSection,
    pub subordinate: HabitSection,
    pub leader: HabitSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerPaths {
    pub strengths: Vec<String>,
    pub challenges: String,
}

/// 結果ページの解説記事
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeArticle {
    pub opening: String,
    pub strengths: ArticleSection,
    pub weaknesses: ArticleSection,
    pub workplace_habits: WorkplaceHabits,
    pub career_paths: CareerPaths,
    pub conclusion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeProfile {
    pub code: MaskTypeCode,
    pub name: String,
    pub short_label: String,
    pub description: String,
    pub image: Option<String>,
    pub axes_summary: AxesSummary,
    pub details: Option<TypeDetails>,
    pub article: Option<TypeArticle>,
}

/// タイプコードから表示用プロフィールを引く表
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    profiles: BTreeMap<MaskTypeCode, TypeProfile>,
}

impl TypeCatalog {
    /// 16タイプすべてが揃い、キー・コード・軸の呼び名が一致していること
    pub fn new(profiles: BTreeMap<MaskTypeCode, TypeProfile>) -> Result<Self, Error> {
        for code in MaskTypeCode::ALL {
            let profile = profiles
                .get(&code)
                .ok_or_else(|| Error::Catalog(format!("missing profile for {code}")))?;
            if profile.code != code {
                return Err(Error::Catalog(format!(
                    "profile keyed {code} declares code {}",
                    profile.code
                )));
            }
            if profile.axes_summary != AxesSummary::of(code) {
                return Err(Error::Catalog(format!(
                    "axes summary of {code} does not match its code"
                )));
            }
        }
        Ok(Self { profiles })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Self::new(serde_json::from_reader(reader)?)
    }

    pub fn get(&self, code: MaskTypeCode) -> Option<&TypeProfile> {
        self.profiles.get(&code)
    }

    /// URLパラメータなど外部から来た文字列で引く。16タイプ以外は `None`
    pub fn lookup(&self, candidate: &str) -> Option<&TypeProfile> {
        candidate
            .parse::<MaskTypeCode>()
            .ok()
            .and_then(|code| self.get(code))
    }

    /// コード順
    pub fn iter(&self) -> impl Iterator<Item = &TypeProfile> {
        self.profiles.values()
    }
}
