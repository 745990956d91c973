use once_cell::sync::Lazy;

pub mod bulk;
pub mod catalog;
pub mod question;
pub mod scoring;
pub mod session;
pub mod store;
pub mod types;

pub use bulk::read_bulk;
pub use catalog::{TypeCatalog, TypeProfile};
pub use question::{Question, QuestionBank, QuestionOption, QuestionOptions};
pub use scoring::{calculate_scores, determine_type_code, is_valid_type_code, score_weight};
pub use session::{DiagnosisSession, Outcome, Step, QUESTIONS_PER_PAGE};
pub use store::{CsvResultStore, DiagnosisRecord, Feedback, ResultStore};
pub use types::{AnswerLevel, Answers, Axis, AxisScorePair, MaskTypeCode, Pole, Scores, Side};

/// 同梱の40設問
pub static QUESTIONS: Lazy<QuestionBank> = Lazy::new(|| {
    QuestionBank::from_reader(include_str!("../resources/questions.json").as_bytes())
        .expect("bundled question bank is well-formed")
});

/// 同梱の16タイプ定義
pub static MASK_TYPES: Lazy<TypeCatalog> = Lazy::new(|| {
    TypeCatalog::from_reader(include_str!("../resources/mask_types.json").as_bytes())
        .expect("bundled type catalog is complete")
});

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 存在しない設問番号
    #[error("unknown question id {0}")]
    IllegalQuestion(u32),
    /// 回答選択肢が違反 (1〜6以外)
    #[error("answer level must be between 1 and 6")]
    IllegalAnswer,
    /// 回答欠落
    #[error("not every question has been answered")]
    NotFullfilled,
    /// 設問数を超えるページ
    #[error("page {0} is past the last page")]
    IllegalPage(usize),
    /// 設問番号の重複
    #[error("duplicate question id {0}")]
    DuplicateQuestion(u32),
    /// 選択肢のタイプコードが設問の軸と一致しない
    #[error("question {0} has options that are not the two codes of its axis")]
    MalformedQuestion(u32),
    #[error("malformed scores: {0}")]
    MalformedScores(String),
    #[error("unknown type code {0:?}")]
    UnknownTypeCode(String),
    #[error("type catalog: {0}")]
    Catalog(String),
    /// 満足度は1〜5
    #[error("rating must be between 1 and 5, got {0}")]
    IllegalRating(u8),
    #[error("malformed bulk header column {0:?}")]
    BulkHeader(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
