use std::io::Read;

use csv::StringRecord;

use crate::types::{AnswerLevel, Answers};
use crate::Error;

/// 回答CSVを一括で読み込む
///
/// ヘッダは `id,<設問番号>,<設問番号>,...`。空欄は未回答として扱い、
/// 1〜6以外の値は読み飛ばす。
pub fn read_bulk<R: Read>(
    reader: R,
) -> Result<impl Iterator<Item = Result<(String, Answers), Error>>, Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let question_ids = reader
        .headers()?
        .iter()
        .skip(1)
        .map(|column| {
            column
                .parse::<u32>()
                .map_err(|_| Error::BulkHeader(column.to_string()))
        })
        .collect::<Result<Vec<u32>, Error>>()?;

    Ok(reader.into_records().map(move |record| {
        record
            .map(|record| to_answers(&record, &question_ids))
            .map_err(Error::from)
    }))
}

fn to_answers(record: &StringRecord, question_ids: &[u32]) -> (String, Answers) {
    let id = record.get(0).unwrap_or_default().to_string();
    let answers = record
        .iter()
        .skip(1)
        .zip(question_ids)
        .filter(|(cell, _)| !cell.is_empty())
        .filter_map(|(cell, &question_id)| {
            let level = cell
                .parse::<u8>()
                .map_err(|_| Error::IllegalAnswer)
                .and_then(AnswerLevel::new);
            match level {
                Ok(level) => Some((question_id, level)),
                Err(_) => {
                    log::warn!("row {id}: skipping answer {cell:?} for question {question_id}");
                    None
                }
            }
        })
        .collect();
    (id, answers)
}
