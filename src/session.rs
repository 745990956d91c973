use serde::{Deserialize, Serialize};

use crate::question::{Question, QuestionBank};
use crate::scoring::{calculate_scores, determine_type_code};
use crate::types::{AnswerLevel, Answers, MaskTypeCode, Scores};
use crate::Error;

/// 1ページあたりの設問数
pub const QUESTIONS_PER_PAGE: usize = 5;

/// 診断完了時の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub type_code: MaskTypeCode,
    pub scores: Scores,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// 次のページ (0始まり) へ進んだ
    Page(usize),
    Finished(Outcome),
}

/// 回答途中の状態
///
/// 呼び出し側が保持し、ページ送りと完了の時点でだけ採点を行う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisSession {
    current_page: usize,
    answers: Answers,
}

impl DiagnosisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn total_pages(bank: &QuestionBank) -> usize {
        bank.len().div_ceil(QUESTIONS_PER_PAGE)
    }

    pub fn is_last_page(&self, bank: &QuestionBank) -> bool {
        self.current_page + 1 >= Self::total_pages(bank)
    }

    /// 現在のページの設問
    pub fn page_questions<'a>(&self, bank: &'a QuestionBank) -> &'a [Question] {
        let questions = bank.questions();
        let start = (self.current_page * QUESTIONS_PER_PAGE).min(questions.len());
        let end = (start + QUESTIONS_PER_PAGE).min(questions.len());
        &questions[start..end]
    }

    /// 設問番号を指定して回答を格納する
    /// 1〜6の回答番号以外は認めない。
    pub fn answer(&mut self, bank: &QuestionBank, question_id: u32, level: u8) -> Result<(), Error> {
        if bank.question(question_id).is_none() {
            return Err(Error::IllegalQuestion(question_id));
        }
        self.answers.insert(question_id, AnswerLevel::new(level)?);
        Ok(())
    }

    pub fn is_page_complete(&self, bank: &QuestionBank) -> bool {
        self.page_questions(bank)
            .iter()
            .all(|question| self.answers.contains(question.id))
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// 回答済みの割合 (%)
    pub fn progress(&self, bank: &QuestionBank) -> f64 {
        if bank.is_empty() {
            return 0.0;
        }
        self.answered_count() as f64 / bank.len() as f64 * 100.0
    }

    /// 全設問に回答済みであること
    pub fn is_complete(&self, bank: &QuestionBank) -> bool {
        bank.questions()
            .iter()
            .all(|question| self.answers.contains(question.id))
    }

    /// ページを進める。最終ページでは全設問の回答を確認して採点し、タイプを決定する
    pub fn next(&mut self, bank: &QuestionBank) -> Result<Step, Error> {
        if self.current_page >= Self::total_pages(bank).max(1) {
            return Err(Error::IllegalPage(self.current_page));
        }
        if !self.is_page_complete(bank) {
            return Err(Error::NotFullfilled);
        }
        if self.is_last_page(bank) {
            if !self.is_complete(bank) {
                return Err(Error::NotFullfilled);
            }
            let scores = calculate_scores(bank.questions(), &self.answers);
            let type_code = determine_type_code(&scores);
            log::debug!("diagnosis finished as {type_code}");
            Ok(Step::Finished(Outcome { type_code, scores }))
        } else {
            self.current_page += 1;
            Ok(Step::Page(self.current_page))
        }
    }

    pub fn previous(&mut self) -> usize {
        self.current_page = self.current_page.saturating_sub(1);
        self.current_page
    }
}
