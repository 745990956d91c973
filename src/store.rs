use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Answers, MaskTypeCode, Scores};
use crate::Error;

/// 保存済みの診断結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub id: Uuid,
    pub result_type: MaskTypeCode,
    pub answers: Answers,
    pub scores: Scores,
    pub created_at: DateTime<Utc>,
}

/// 結果ページで送られる満足度 (1〜5) とコメント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub diagnosis_result_id: Option<Uuid>,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 診断結果とフィードバックの保存先
///
/// 採点には関与しない。保存の失敗は呼び出し側で記録するだけで、結果表示は続ける。
pub trait ResultStore {
    fn save_diagnosis_result(
        &mut self,
        result_type: MaskTypeCode,
        answers: &Answers,
        scores: &Scores,
    ) -> Result<DiagnosisRecord, Error>;

    fn save_feedback(
        &mut self,
        rating: u8,
        comment: Option<&str>,
        diagnosis_result_id: Option<Uuid>,
    ) -> Result<Feedback, Error>;

    /// タイプごとの診断件数
    fn result_type_stats(&self) -> Result<BTreeMap<MaskTypeCode, usize>, Error>;
}

const DIAGNOSIS_RESULTS: &str = "diagnosis_results.csv";
const FEEDBACK: &str = "feedback.csv";

/// ディレクトリ内の追記専用CSVに保存する
#[derive(Debug, Clone)]
pub struct CsvResultStore {
    dir: PathBuf,
}

/// CSVの1行。回答と得点はJSON文字列で持つ
#[derive(Debug, Serialize, Deserialize)]
struct DiagnosisRow {
    id: Uuid,
    result_type: MaskTypeCode,
    answers: String,
    scores: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<DiagnosisRow> for DiagnosisRecord {
    type Error = Error;

    fn try_from(row: DiagnosisRow) -> Result<Self, Self::Error> {
        Ok(DiagnosisRecord {
            id: row.id,
            result_type: row.result_type,
            answers: serde_json::from_str(&row.answers)?,
            scores: serde_json::from_str(&row.scores)?,
            created_at: row.created_at,
        })
    }
}

impl CsvResultStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::debug!("result store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 保存済みの診断結果を保存順で読み出す
    pub fn diagnosis_results(&self) -> Result<Vec<DiagnosisRecord>, Error> {
        read_rows::<DiagnosisRow>(&self.dir.join(DIAGNOSIS_RESULTS))?
            .into_iter()
            .map(DiagnosisRecord::try_from)
            .collect()
    }

    pub fn feedback(&self) -> Result<Vec<Feedback>, Error> {
        read_rows(&self.dir.join(FEEDBACK))
    }
}

impl ResultStore for CsvResultStore {
    fn save_diagnosis_result(
        &mut self,
        result_type: MaskTypeCode,
        answers: &Answers,
        scores: &Scores,
    ) -> Result<DiagnosisRecord, Error> {
        let record = DiagnosisRecord {
            id: Uuid::new_v4(),
            result_type,
            answers: answers.clone(),
            scores: *scores,
            created_at: Utc::now(),
        };
        append_row(
            &self.dir.join(DIAGNOSIS_RESULTS),
            &DiagnosisRow {
                id: record.id,
                result_type,
                answers: serde_json::to_string(answers)?,
                scores: serde_json::to_string(scores)?,
                created_at: record.created_at,
            },
        )?;
        log::info!("saved diagnosis result {} ({result_type})", record.id);
        Ok(record)
    }

    fn save_feedback(
        &mut self,
        rating: u8,
        comment: Option<&str>,
        diagnosis_result_id: Option<Uuid>,
    ) -> Result<Feedback, Error> {
        if !(1..=5).contains(&rating) {
            return Err(Error::IllegalRating(rating));
        }
        let feedback = Feedback {
            id: Uuid::new_v4(),
            diagnosis_result_id,
            rating,
            comment: comment
                .map(str::trim)
                .filter(|comment| !comment.is_empty())
                .map(str::to_string),
            created_at: Utc::now(),
        };
        append_row(&self.dir.join(FEEDBACK), &feedback)?;
        log::info!("saved feedback {}", feedback.id);
        Ok(feedback)
    }

    fn result_type_stats(&self) -> Result<BTreeMap<MaskTypeCode, usize>, Error> {
        let path = self.dir.join(DIAGNOSIS_RESULTS);
        let mut stats = BTreeMap::new();
        if !path.exists() {
            return Ok(stats);
        }
        let mut reader = csv::Reader::from_path(&path)?;
        for row in reader.deserialize::<DiagnosisRow>() {
            match row {
                Ok(row) => *stats.entry(row.result_type).or_insert(0) += 1,
                Err(e) => log::warn!("skipping unreadable row in {}: {e}", path.display()),
            }
        }
        Ok(stats)
    }
}

fn append_row<T: Serialize>(path: &Path, row: &T) -> Result<(), Error> {
    let has_header = path.exists() && fs::metadata(path)?.len() > 0;
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(!has_header)
        .from_writer(file);
    writer.serialize(row)?;
    writer.flush()?;
    Ok(())
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, Error> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize()
        .map(|row| row.map_err(Error::from))
        .collect()
}
